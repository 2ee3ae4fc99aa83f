mod common;
mod criticality;

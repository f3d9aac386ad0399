pub mod configuration;
pub mod controller;
pub mod data_capture;
pub mod error_handling;
pub mod remote;
pub mod session_management;
pub mod storage;

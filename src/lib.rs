pub mod benchmark;
pub mod build_info;
pub mod device;
pub mod domain;
pub mod init;
pub mod instruments;
pub mod kernel;
pub mod par_slice;
pub mod stencil;
pub mod strategy;
pub mod util;

pub mod attendance;
pub mod kyc;
pub mod notification;
pub mod resource;
pub mod role;
pub mod task;

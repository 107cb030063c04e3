pub mod assignment;
pub mod delivery;
pub mod lifecycle;
pub mod otp;
pub mod settlement;

pub mod audit;
pub mod booking;

pub use audit::*;
pub use booking::BookingService;

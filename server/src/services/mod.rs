pub mod bookings;
pub mod catalog;
pub mod checkout;
pub mod contact;
pub mod navigation;
pub mod organizer;

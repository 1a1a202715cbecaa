pub mod booking;
pub mod checkout;
pub mod contact;
pub mod event;
pub mod money;
pub mod organizer;
pub mod ticket;

pub use booking::{Booking, BookingStatus, BookingTicket};
pub use event::{Event, EventStatus};
pub use money::Money;
pub use ticket::{TicketSelection, TicketType};

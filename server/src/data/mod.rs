//! Static sample catalog and bookings served by the API.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::{Booking, BookingStatus, BookingTicket, Event, Money, TicketType};

pub const CATEGORIES: &[&str] = &[
    "Technology",
    "Music",
    "Food & Drink",
    "Business",
    "Entertainment",
    "Health & Wellness",
    "Sports",
    "Education",
    "Arts & Culture",
];

pub const CITIES: &[&str] = &[
    "San Francisco",
    "New York",
    "Los Angeles",
    "Austin",
    "Portland",
    "Boulder",
    "Seattle",
    "Chicago",
    "Miami",
];

pub const ALL_CITIES: &str = "All Cities";
pub const ALL_CATEGORIES: &str = "All Categories";

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("seed date is valid")
}

fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("seed time is valid")
}

fn instant(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

fn tier(id: &str, name: &str, dollars: i64, available: u32, total: u32) -> TicketType {
    TicketType::new(id, name, Money::from_dollars(dollars), available, total)
}

struct Listing<'a> {
    id: &'a str,
    title: &'a str,
    description: &'a str,
    date: NaiveDate,
    time: NaiveTime,
    location: &'a str,
    city: &'a str,
    venue: &'a str,
    image: &'a str,
    category: &'a str,
    dollars: i64,
    organizer: (&'a str, &'a str),
    tiers: Vec<TicketType>,
    sold: u32,
    featured: bool,
}

impl Listing<'_> {
    fn into_event(self) -> Event {
        let total_capacity = self.tiers.iter().map(|t| t.total).sum();
        Event {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            date: self.date,
            time: self.time,
            location: self.location.to_string(),
            city: self.city.to_string(),
            venue: self.venue.to_string(),
            image: self.image.to_string(),
            category: self.category.to_string(),
            price: Money::from_dollars(self.dollars),
            organizer_id: self.organizer.0.to_string(),
            organizer_name: self.organizer.1.to_string(),
            ticket_types: self.tiers,
            total_capacity,
            sold_tickets: self.sold,
            featured: self.featured,
        }
    }
}

const IMAGE_QUERY: &str = "?auto=format&fit=crop&w=2070&q=80";

fn image(photo: &str) -> String {
    format!("https://images.unsplash.com/{photo}{IMAGE_QUERY}")
}

/// The six sample events, in catalog order.
pub fn seed_events() -> Vec<Event> {
    let images = [
        image("photo-1540575467063-178a50c2df87"),
        image("photo-1493225457124-a3eb161ffa5f"),
        image("photo-1556909114-f6e7ad7d3136"),
        image("photo-1559136555-9303baea8ebd"),
        image("photo-1489599328020-619b75e17d74"),
        image("photo-1506126613408-eca07ce68773"),
    ];

    let listings = vec![
        Listing {
            id: "1",
            title: "Tech Innovation Summit 2024",
            description: "Join leading tech innovators and entrepreneurs for a day of cutting-edge presentations, networking, and product launches. Discover the latest trends in AI, blockchain, and sustainable technology.",
            date: day(2024, 3, 15),
            time: at(9, 0),
            location: "San Francisco Convention Center",
            city: "San Francisco",
            venue: "Main Auditorium",
            image: &images[0],
            category: "Technology",
            dollars: 299,
            organizer: ("org-1", "TechEvents Inc."),
            tiers: vec![
                tier("early-bird", "Early Bird", 199, 50, 100),
                tier("regular", "Regular", 299, 200, 300),
                tier("vip", "VIP", 499, 45, 50),
            ],
            sold: 105,
            featured: true,
        },
        Listing {
            id: "2",
            title: "Jazz Under the Stars",
            description: "An enchanting evening of smooth jazz performed by world-class musicians in a magical outdoor setting. Bring your friends and enjoy an unforgettable musical experience.",
            date: day(2024, 3, 22),
            time: at(19, 30),
            location: "Central Park Amphitheater",
            city: "New York",
            venue: "Outdoor Stage",
            image: &images[1],
            category: "Music",
            dollars: 75,
            organizer: ("org-2", "NYC Jazz Collective"),
            tiers: vec![
                tier("general", "General Admission", 75, 300, 500),
                tier("premium", "Premium Seating", 125, 80, 100),
            ],
            sold: 220,
            featured: true,
        },
        Listing {
            id: "3",
            title: "Culinary Arts Workshop",
            description: "Learn from Michelin-starred chefs in this hands-on cooking workshop. Master the art of French cuisine and take home recipes that will impress your family and friends.",
            date: day(2024, 3, 28),
            time: at(14, 0),
            location: "The Culinary Institute",
            city: "Los Angeles",
            venue: "Chef's Kitchen",
            image: &images[2],
            category: "Food & Drink",
            dollars: 150,
            organizer: ("org-3", "Culinary Masters"),
            tiers: vec![tier("standard", "Standard Workshop", 150, 20, 25)],
            sold: 5,
            featured: false,
        },
        Listing {
            id: "4",
            title: "Digital Marketing Conference",
            description: "Stay ahead of the curve with the latest digital marketing strategies. Network with industry leaders and discover tools that will transform your marketing efforts.",
            date: day(2024, 4, 5),
            time: at(10, 0),
            location: "Austin Convention Center",
            city: "Austin",
            venue: "Conference Hall A",
            image: &images[3],
            category: "Business",
            dollars: 199,
            organizer: ("org-1", "TechEvents Inc."),
            tiers: vec![
                tier("student", "Student", 99, 50, 75),
                tier("professional", "Professional", 199, 150, 200),
                tier("enterprise", "Enterprise", 399, 40, 50),
            ],
            sold: 135,
            featured: true,
        },
        Listing {
            id: "5",
            title: "Indie Film Festival",
            description: "Celebrate independent cinema with a curated selection of groundbreaking films from emerging directors worldwide. Join Q&A sessions with filmmakers after each screening.",
            date: day(2024, 4, 12),
            time: at(18, 0),
            location: "Downtown Theater",
            city: "Portland",
            venue: "Main Screen",
            image: &images[4],
            category: "Entertainment",
            dollars: 25,
            organizer: ("org-4", "Portland Film Society"),
            tiers: vec![
                tier("single", "Single Screening", 25, 80, 120),
                tier("day-pass", "Day Pass", 60, 30, 40),
            ],
            sold: 50,
            featured: false,
        },
        Listing {
            id: "6",
            title: "Yoga & Wellness Retreat",
            description: "Reconnect with yourself in this transformative weekend retreat. Includes yoga sessions, meditation workshops, healthy meals, and wellness talks from certified instructors.",
            date: day(2024, 4, 20),
            time: at(8, 0),
            location: "Mountain View Resort",
            city: "Boulder",
            venue: "Wellness Center",
            image: &images[5],
            category: "Health & Wellness",
            dollars: 350,
            organizer: ("org-5", "Mindful Living Co."),
            tiers: vec![
                tier("shared", "Shared Accommodation", 350, 15, 20),
                tier("private", "Private Room", 500, 8, 10),
            ],
            sold: 7,
            featured: true,
        },
    ];

    listings.into_iter().map(Listing::into_event).collect()
}

/// Bookings that exist before any checkout completes.
pub fn seed_bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: "booking-1".to_string(),
            event_id: "1".to_string(),
            event_title: "Tech Innovation Summit 2024".to_string(),
            event_date: instant(day(2024, 3, 15), at(9, 0)),
            event_location: "San Francisco Convention Center".to_string(),
            tickets: vec![BookingTicket {
                ticket_type_id: "regular".to_string(),
                ticket_type_name: "Regular".to_string(),
                quantity: 2,
                price: Money::from_dollars(299),
            }],
            total_amount: Money::from_dollars(598),
            status: BookingStatus::Confirmed,
            booking_date: instant(day(2024, 2, 10), at(0, 0)),
            qr_code: "QR123456789".to_string(),
        },
        Booking {
            id: "booking-2".to_string(),
            event_id: "2".to_string(),
            event_title: "Jazz Under the Stars".to_string(),
            event_date: instant(day(2024, 3, 22), at(19, 30)),
            event_location: "Central Park Amphitheater".to_string(),
            tickets: vec![BookingTicket {
                ticket_type_id: "premium".to_string(),
                ticket_type_name: "Premium Seating".to_string(),
                quantity: 1,
                price: Money::from_dollars(125),
            }],
            total_amount: Money::from_dollars(125),
            status: BookingStatus::Confirmed,
            booking_date: instant(day(2024, 2, 15), at(0, 0)),
            qr_code: "QR987654321".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_capacity_matches_tiers() {
        let events = seed_events();
        assert_eq!(events.len(), 6);
        assert_eq!(events[0].total_capacity, 450);
        assert_eq!(events[3].total_capacity, 325);
        for event in &events {
            assert!(event.ticket_types.iter().all(|t| t.available <= t.total));
            assert!(CITIES.contains(&event.city.as_str()));
            assert!(CATEGORIES.contains(&event.category.as_str()));
        }
    }

    #[test]
    fn test_seed_booking_totals() {
        for booking in seed_bookings() {
            let total = Money::checked_sum(
                booking
                    .tickets
                    .iter()
                    .map(|t| t.price.checked_mul(u64::from(t.quantity)).unwrap()),
            );
            assert_eq!(total, Some(booking.total_amount));
        }
    }
}

//! Data models for the booking platform's entities.
//!
//! - `User`: travelers and tour guides, distinguished by `role_id`
//! - `City`: the cities destinations belong to
//! - `Destination`: bookable places with fees, hours and ratings
//! - `Appointment`: a traveler booking a tour guide at a destination
//!
//! Each entity has matching create/update payload types. Update payloads
//! are partial: unset fields are not sent.

pub mod appointment;
pub mod city;
pub mod destination;
pub mod user;

pub use appointment::{
    Appointment, AppointmentDestination, AppointmentParty, AppointmentStatus, CreateAppointment,
    UpdateAppointment,
};
pub use city::{City, CityData};
pub use destination::{CreateDestination, Destination, DestinationImage, UpdateDestination};
pub use user::{CreateUser, PhotoUpload, Role, UpdateUser, User};

//! Domain model module declarations.

pub mod checkin;

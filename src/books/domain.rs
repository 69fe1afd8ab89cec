use crate::core::domain::Identifiable;

pub mod model;

pub trait Book: Identifiable {
    fn title(&self) -> String;
    fn is_available(&self) -> bool;
    fn times_borrowed(&self) -> i64;
}

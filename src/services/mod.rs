// Customer and order intake
pub mod customers;
pub mod measurements;
pub mod orders;

// Production
pub mod work_orders;

// Weekly calendar
pub mod scheduling;

// Form autosave
pub mod drafts;

use once_cell::sync::Lazy;
use regex::Regex;

pub use customers::CustomerService;
pub use drafts::{DbDraftStore, DraftService, DraftStore, InMemoryDraftStore};
pub use measurements::MeasurementService;
pub use orders::OrderService;
pub use scheduling::SchedulingService;
pub use work_orders::WorkOrderService;

/// Egyptian mobile numbers: `01` + carrier digit (0/1/2/5) + eight digits.
pub static PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^01[0125][0-9]{8}$").unwrap());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_regex_matches_the_four_carriers() {
        for number in ["01012345678", "01112345678", "01212345678", "01512345678"] {
            assert!(PHONE_REGEX.is_match(number), "{number} should match");
        }
    }

    #[test]
    fn phone_regex_rejects_wrong_shapes() {
        for number in ["0101234567", "010123456789", "01312345678", "21012345678", ""] {
            assert!(!PHONE_REGEX.is_match(number), "{number} should not match");
        }
    }
}

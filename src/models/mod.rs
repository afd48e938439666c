mod booking;
mod feedback;
mod listing;
mod points;
mod principal;
mod preference;
mod state;
mod tag;

pub use booking::{
    Booking, BookingStatus, EscrowPayment, NewBooking, NewEscrowPayment, PaymentStatus, Payout,
    PayoutStatus, Settlement,
};
pub use feedback::{Feedback, FeedbackOutcome, FeedbackSubmission, HardSellReport};
pub use listing::{CatalogEntry, Merchant, NewMerchant, NewServiceListing, ServiceCategory, ServiceListing};
pub use points::{PointsAward, PointsReason, PointsSummary, PointsTransaction};
pub use principal::{Principal, Role};
pub use preference::{
    Availability, BudgetBand, DayOfWeek, QuizAnswers, TimeOfDay, UserPreference,
};
pub use state::AppState;
pub use tag::{TagCategory, Taxonomy, TaxonomyTag, fuzzy_matches};

mod mobile_number;
mod referral;

pub use mobile_number::MobileNumber;
pub use referral::{NewReferral, Referral};

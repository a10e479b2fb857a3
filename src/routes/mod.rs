mod referrals;
mod root;

pub use referrals::{INVALID_REFERRAL_DETAILS, insert_referral, post_submit_referral};
pub use root::get_root;

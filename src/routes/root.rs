pub const WELCOME_MESSAGE: &str = "Welcome to the Referral App";

pub async fn get_root() -> &'static str {
    WELCOME_MESSAGE
}

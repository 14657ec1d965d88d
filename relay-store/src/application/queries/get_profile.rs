#[derive(Debug, Clone)]
pub struct GetProfileQuery {
    pub phone_number: String,
}

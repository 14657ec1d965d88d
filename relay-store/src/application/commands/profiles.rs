#[derive(Debug, Clone)]
pub struct CreateProfileCommand {
    pub phone_number: String,
    pub name: String,
    pub avatar: String,
}

#[derive(Debug, Clone)]
pub struct UpdateProfileCommand {
    pub phone_number: String,
    pub name: String,
    pub avatar: String,
}

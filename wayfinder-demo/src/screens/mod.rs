mod conversations;
mod login;
mod welcome;

pub use conversations::ConversationsScreen;
pub use login::LoginScreen;
pub use welcome::WelcomeScreen;

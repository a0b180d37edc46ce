pub mod user_movies;
pub mod users;
pub mod view_history;

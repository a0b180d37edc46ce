use sea_orm::entity::prelude::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};

const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// A movie as returned by TMDB list and detail endpoints. Only the fields the
/// pages render are kept.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Movie {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PosterSize {
    /// Grid cards.
    Card,
    /// Details page.
    Detail,
}

impl PosterSize {
    fn tmdb_width(self) -> &'static str {
        match self {
            PosterSize::Card => "w200",
            PosterSize::Detail => "w300",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            PosterSize::Card => "https://via.placeholder.com/200x300?text=No+Image",
            PosterSize::Detail => "https://via.placeholder.com/300x450?text=No+Image",
        }
    }
}

impl Movie {
    pub fn rating(&self) -> String {
        match self.vote_average {
            Some(v) => format!("{v:.1}"),
            None => "N/A".to_string(),
        }
    }

    pub fn poster_url(&self, size: PosterSize) -> String {
        match self.poster_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => {
                format!("{IMAGE_BASE_URL}/{}{path}", size.tmdb_width())
            },
            _ => size.placeholder().to_string(),
        }
    }

    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Which per-user list a stored movie id belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum Category {
    #[sea_orm(string_value = "watchlist")]
    Watchlist,
    #[sea_orm(string_value = "favorites")]
    Favorites,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Watchlist => "watchlist",
            Category::Favorites => "favorites",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Watchlist => "Watchlist",
            Category::Favorites => "Favorites",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Category::Watchlist => "/watchlist",
            Category::Favorites => "/favorites",
        }
    }

    pub fn empty_message(self) -> &'static str {
        match self {
            Category::Watchlist => "Your watchlist is empty.",
            Category::Favorites => "Your favorites list is empty.",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Recommendations {
    pub query: String,
    pub based_on: Option<Movie>,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub movie_title: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub movie_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

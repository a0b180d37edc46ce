use maud::{DOCTYPE, Markup, html};

use crate::{
    models::{Category, Movie, PosterSize, Recommendations},
    session::{FlashLevel, PageContext},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Which of the visitor's lists already hold the movie on a details page.
#[derive(Clone, Copy, Debug, Default)]
pub struct ListMembership {
    pub in_watchlist: bool,
    pub in_favorites: bool,
}

pub fn index_page(
    ctx: &PageContext,
    trending: &[Movie],
    recommendations: Option<&Recommendations>,
) -> String {
    page(
        "Movie Deck",
        ctx,
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-3xl font-bold text-gray-900" { "Find something to watch" }
                p class="mt-2 text-gray-600" { "Name a movie you like and get recommendations." }

                form class="mt-6 flex gap-3" method="post" action="/recommend" {
                    input class="flex-1 rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500" name="movie_title" id="movie_title" placeholder="Movie title" required;
                    button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { "Recommend" }
                }
            }

            @if let Some(rec) = recommendations {
                section class="mt-10" {
                    h2 class="text-2xl font-semibold text-gray-900" { "Recommendations" }
                    @if let Some(base) = &rec.based_on {
                        p class="mt-1 text-gray-600" { "Because you searched for " (rec.query) ": based on " a class="text-blue-600 hover:text-blue-800" href=(movie_href(base.id)) { (base.title) } }
                    }
                    @if rec.movies.is_empty() {
                        p class="mt-6 text-gray-600" { "No recommendations found for \"" (rec.query) "\"." }
                    } @else {
                        (movie_grid(&rec.movies))
                    }
                }
            } @else {
                section class="mt-10" {
                    h2 class="text-2xl font-semibold text-gray-900" { "Trending this week" }
                    @if trending.is_empty() {
                        p class="mt-6 text-gray-600" { "No trending movies right now." }
                    } @else {
                        (movie_grid(trending))
                    }
                }
            }
        },
    )
}

pub fn movie_list_page(ctx: &PageContext, heading: &str, movies: &[Movie]) -> String {
    page(
        heading,
        ctx,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { (heading) }
            @if movies.is_empty() {
                p class="mt-6 text-gray-600" { "No movies found." }
            } @else {
                (movie_grid(movies))
            }
        },
    )
}

pub fn movie_details_page(
    ctx: &PageContext,
    movie: &Movie,
    membership: Option<ListMembership>,
) -> String {
    page(
        &movie.title,
        ctx,
        html! {
            div class="bg-white shadow rounded-lg p-8 flex flex-col gap-8 md:flex-row" {
                img class="w-[300px] rounded-md" src=(movie.poster_url(PosterSize::Detail)) alt=(movie.title);
                div class="flex-1" {
                    h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                    dl class="mt-4 space-y-1 text-gray-700" {
                        div { dt class="inline font-medium" { "Release date: " } dd class="inline" { (movie.release_date().unwrap_or("Unknown")) } }
                        div { dt class="inline font-medium" { "Rating: " } dd class="inline" { (movie.rating()) } }
                    }
                    @if let Some(overview) = movie.overview.as_deref().filter(|o| !o.trim().is_empty()) {
                        p class="mt-6 text-gray-700 leading-relaxed" { (overview) }
                    }

                    @if let Some(m) = membership {
                        div class="mt-8 flex flex-wrap gap-3" {
                            (list_toggle(movie.id, Category::Watchlist, m.in_watchlist))
                            (list_toggle(movie.id, Category::Favorites, m.in_favorites))
                        }
                    } @else {
                        p class="mt-8 text-sm text-gray-500" {
                            a class="text-blue-600 hover:text-blue-800" href="/login" { "Log in" }
                            " to add this movie to your watchlist or favorites."
                        }
                    }
                }
            }
        },
    )
}

pub fn saved_list_page(ctx: &PageContext, category: Category, movies: &[Movie]) -> String {
    page(
        category.title(),
        ctx,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Your " (category.title()) }
            @if movies.is_empty() {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { (category.empty_message()) }
                }
            } @else {
                ul class="mt-8 space-y-4" {
                    @for movie in movies {
                        li class="bg-white shadow rounded-lg p-4 flex items-center gap-4" {
                            img class="w-16 rounded" src=(movie.poster_url(PosterSize::Card)) alt=(movie.title);
                            div class="flex-1" {
                                a class="text-lg font-semibold text-gray-900 hover:text-blue-700" href=(movie_href(movie.id)) { (movie.title) }
                                p class="text-sm text-gray-500" { (movie.release_date().unwrap_or("Unknown")) " · " (movie.rating()) }
                            }
                            form method="post" action=(category.path()) {
                                input type="hidden" name="movie_id" value=(movie.id);
                                button class="rounded-md border border-red-300 px-3 py-1 text-sm text-red-700 hover:bg-red-50" type="submit" { "Remove" }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn history_page(ctx: &PageContext, movies: &[Movie]) -> String {
    page(
        "History",
        ctx,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Recently viewed" }
            @if movies.is_empty() {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "Your viewing history is empty." }
                }
            } @else {
                (movie_grid(movies))
            }
        },
    )
}

pub fn login_page(ctx: &PageContext) -> String {
    credentials_page(ctx, "Log in", "/login", html! {
        "No account? " a class="text-blue-600 hover:text-blue-800" href="/register" { "Register" }
    })
}

pub fn register_page(ctx: &PageContext) -> String {
    credentials_page(ctx, "Register", "/register", html! {
        "Already registered? " a class="text-blue-600 hover:text-blue-800" href="/login" { "Log in" }
    })
}

pub fn error_page(message: String) -> String {
    page(
        "Error",
        &PageContext::default(),
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { "Error" }
                p class="mt-4 text-gray-700" { (message) }
                a class="mt-6 inline-block text-blue-600 hover:text-blue-800" href="/" { "Back" }
            }
        },
    )
}

fn credentials_page(ctx: &PageContext, title: &str, action: &str, footer: Markup) -> String {
    page(
        title,
        ctx,
        html! {
            div class="max-w-md mx-auto bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { (title) }
                form class="mt-6 space-y-6" method="post" action=(action) {
                    div {
                        label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                        input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" name="username" id="username" maxlength="150" autocomplete="username" required;
                    }
                    div {
                        label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                        input class="mt-2 w-full rounded-md border border-gray-300 px-3 py-2" type="password" name="password" id="password" required;
                    }
                    button class="w-full rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" { (title) }
                }
                p class="mt-6 text-sm text-gray-600" { (footer) }
            }
        },
    )
}

fn page(title: &str, ctx: &PageContext, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Movie Deck" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav(ctx))
                main class="max-w-5xl mx-auto px-6 py-10" {
                    @for flash in &ctx.flashes {
                        div class=(format!("mb-6 rounded-md border px-4 py-3 {}", flash_classes(flash.level))) role="alert" {
                            (flash.message)
                        }
                    }
                    (body)
                }
            }
        }
    }
    .into_string()
}

fn nav(ctx: &PageContext) -> Markup {
    html! {
        nav class="bg-gray-900 text-gray-100" {
            div class="max-w-5xl mx-auto px-6 py-3 flex flex-wrap items-center gap-5 text-sm" {
                a class="text-lg font-bold text-white" href="/" { "Movie Deck" }
                a class="hover:text-white" href="/top-rated" { "Top Rated" }
                a class="hover:text-white" href="/new-released" { "New Releases" }
                @if let Some(username) = &ctx.username {
                    a class="hover:text-white" href="/watchlist" { "Watchlist" }
                    a class="hover:text-white" href="/favorites" { "Favorites" }
                    a class="hover:text-white" href="/history" { "History" }
                    span class="ml-auto text-gray-400" { (username) }
                    a class="hover:text-white" href="/logout" { "Logout" }
                } @else {
                    a class="ml-auto hover:text-white" href="/login" { "Login" }
                    a class="hover:text-white" href="/register" { "Register" }
                }
            }
        }
    }
}

fn flash_classes(level: FlashLevel) -> &'static str {
    match level {
        FlashLevel::Success => "border-green-300 bg-green-50 text-green-800",
        FlashLevel::Danger => "border-red-300 bg-red-50 text-red-800",
        FlashLevel::Info => "border-blue-300 bg-blue-50 text-blue-800",
    }
}

fn movie_grid(movies: &[Movie]) -> Markup {
    html! {
        div class="mt-6 grid grid-cols-2 gap-6 sm:grid-cols-3 md:grid-cols-4" {
            @for movie in movies {
                (movie_card(movie))
            }
        }
    }
}

fn movie_card(movie: &Movie) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg overflow-hidden hover:shadow-md" href=(movie_href(movie.id)) {
            img class="w-full" src=(movie.poster_url(PosterSize::Card)) alt=(movie.title) loading="lazy";
            div class="p-3" {
                h3 class="font-semibold text-gray-900" { (movie.title) }
                p class="text-sm text-gray-500" {
                    @if let Some(date) = movie.release_date() { (date) " · " }
                    "★ " (movie.rating())
                }
            }
        }
    }
}

fn list_toggle(movie_id: i32, category: Category, present: bool) -> Markup {
    html! {
        @if present {
            form method="post" action=(category.path()) {
                input type="hidden" name="movie_id" value=(movie_id);
                button class="rounded-md border border-gray-300 px-4 py-2 text-gray-700 hover:bg-gray-100" type="submit" {
                    "Remove from " (category.title())
                }
            }
        } @else {
            form method="post" action=(format!("{}/add/{movie_id}", category.path())) {
                button class="rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700" type="submit" {
                    "Add to " (category.title())
                }
            }
        }
    }
}

fn movie_href(movie_id: i32) -> String {
    format!("/movie/{movie_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Flash;

    fn movie() -> Movie {
        Movie {
            id: 7,
            title: "<Tom & Jerry>".to_string(),
            release_date: None,
            vote_average: None,
            overview: None,
            poster_path: None,
        }
    }

    #[test]
    fn escapes_titles() {
        let html = movie_list_page(&PageContext::default(), "Top Rated", &[movie()]);
        assert!(html.contains("&lt;Tom &amp; Jerry&gt;"));
        assert!(!html.contains("<Tom"));
    }

    #[test]
    fn nav_reflects_login_state() {
        let anon = index_page(&PageContext::default(), &[], None);
        assert!(anon.contains("href=\"/login\""));
        assert!(!anon.contains("href=\"/logout\""));

        let ctx = PageContext { username: Some("ana".to_string()), flashes: Vec::new() };
        let html = index_page(&ctx, &[], None);
        assert!(html.contains("href=\"/logout\""));
        assert!(html.contains("ana"));
    }

    #[test]
    fn renders_flash_banner() {
        let ctx = PageContext {
            username: None,
            flashes: vec![Flash::info("Please log in."), Flash::danger("Invalid credentials")],
        };
        let html = login_page(&ctx);
        let info = html.find("Please log in.").unwrap();
        let danger = html.find("Invalid credentials").unwrap();
        assert!(info < danger);
        assert!(html.contains("bg-red-50"));
    }

    #[test]
    fn details_offer_add_or_remove() {
        let ctx = PageContext { username: Some("ana".to_string()), flashes: Vec::new() };
        let membership = ListMembership { in_watchlist: true, in_favorites: false };
        let html = movie_details_page(&ctx, &movie(), Some(membership));
        assert!(html.contains("Remove from Watchlist"));
        assert!(html.contains("action=\"/favorites/add/7\""));
        assert!(html.contains("Release date: "));
        assert!(html.contains("Unknown"));
    }

    #[test]
    fn empty_lists_show_message() {
        let html = saved_list_page(&PageContext::default(), Category::Favorites, &[]);
        assert!(html.contains("Your favorites list is empty."));
    }
}

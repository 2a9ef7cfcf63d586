//! Page templates

use askama::Template;
use axum::response::Html;

use crate::{error::WebResult, movie_card::MovieCard, signin::SignInView};

#[derive(Template)]
#[template(path = "signin.html")]
pub struct SignInTemplate {
    pub view: SignInView,
}

#[derive(Template)]
#[template(path = "catalog.html")]
pub struct CatalogTemplate {
    pub cards: Vec<MovieCard>,
}

#[derive(Template)]
#[template(path = "movie.html")]
pub struct MovieTemplate {
    pub card: MovieCard,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

/// Render a template into an HTML response body
pub fn render<T: Template>(template: &T) -> WebResult<Html<String>> {
    Ok(Html(template.render()?))
}

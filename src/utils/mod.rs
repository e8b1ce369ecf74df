pub mod session;

pub use session::{current_user_id, set_user_session};

use axum::response::Html;
use tera::{Context, Tera};

pub fn render_template(tera: &Tera, template_name: &str, context: Context) -> Html<String> {
    Html(
        tera.render(template_name, &context)
            .unwrap_or_else(|_| format!("Error rendering template: {}", template_name)),
    )
}

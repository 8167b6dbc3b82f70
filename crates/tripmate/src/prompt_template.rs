use serde::Serialize;
use tera::{Context, Error as TeraError, Tera};

pub const SUPERVISOR_PROMPT: &str = include_str!("prompts/supervisor.md");
pub const TRANSPORT_PROMPT: &str = include_str!("prompts/transport.md");
pub const HOTEL_PROMPT: &str = include_str!("prompts/hotel.md");
pub const ITINERARY_PROMPT: &str = include_str!("prompts/itinerary.md");

pub fn load_prompt<T: Serialize>(template: &str, context_data: &T) -> Result<String, TeraError> {
    let mut tera = Tera::default();
    tera.add_raw_template("inline_template", template)?;
    let context = Context::from_serialize(context_data)?;
    let rendered = tera.render("inline_template", &context)?;
    Ok(rendered)
}

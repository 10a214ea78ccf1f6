// Routes component and modal interactions by custom id prefix.

pub mod reset_panel;
pub mod wizard_menu;

use crate::discord::{Data, Error};
use poise::serenity_prelude as serenity;

pub async fn handle_interaction(
    ctx: &serenity::Context,
    data: &Data,
    interaction: &serenity::Interaction,
) -> Result<(), Error> {
    match interaction {
        serenity::Interaction::Component(component) => {
            let custom_id = component.data.custom_id.as_str();
            if let Some(menu) = wizard_menu::parse_custom_id(custom_id) {
                wizard_menu::handle_select(ctx, data, component, menu).await
            } else if custom_id.starts_with("ladder:panel:") {
                reset_panel::handle_button(ctx, data, component).await
            } else {
                Ok(())
            }
        }
        serenity::Interaction::Modal(modal) => reset_panel::handle_modal(ctx, data, modal).await,
        _ => Ok(()),
    }
}

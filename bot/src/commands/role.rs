use common::Lane;
use serenity::all::{
    CommandInteraction, CommandOptionType, Context, CreateCommand, CreateCommandOption,
};

use super::{api_failure, lane_name, respond, str_option};
use crate::handler::Handler;

fn lane_option(name: &str, description: &str) -> CreateCommandOption {
    Lane::ALL.into_iter().fold(
        CreateCommandOption::new(CommandOptionType::String, name, description).required(true),
        |option, lane| {
            let mut label = lane.as_str().to_lowercase();
            label[..1].make_ascii_uppercase();
            option.add_string_choice(label, lane.as_str())
        },
    )
}

pub fn register() -> CreateCommand {
    CreateCommand::new("role")
        .description("Set the lanes you prefer to play")
        .add_option(lane_option("primary", "Lane you want most"))
        .add_option(lane_option("secondary", "Lane you take otherwise"))
}

pub async fn run(
    ctx: &Context,
    command: &CommandInteraction,
    handler: &Handler,
) -> Result<(), serenity::Error> {
    let catalog = &handler.catalog;
    let options = &command.data.options;

    let primary = str_option(options, "primary").and_then(|s| s.parse::<Lane>().ok());
    let secondary = str_option(options, "secondary").and_then(|s| s.parse::<Lane>().ok());

    let content = match (primary, secondary) {
        (Some(primary), Some(secondary)) if primary == secondary => {
            catalog.format("role.same_lane", &[])
        }
        (Some(primary), Some(secondary)) => {
            let preferences = common::RolePreferences {
                name: command.user.display_name().to_owned(),
                primary,
                secondary,
            };

            match handler
                .api
                .set_roles(&command.user.id.to_string(), &preferences)
                .await
            {
                Ok(()) => {
                    let primary = lane_name(catalog, primary);
                    let secondary = lane_name(catalog, secondary);
                    catalog.format(
                        "role.saved",
                        &[
                            ("primary", primary.as_str()),
                            ("secondary", secondary.as_str()),
                        ],
                    )
                }
                Err(e) => api_failure(catalog, &e),
            }
        }
        _ => {
            tracing::warn!("Role command without valid lanes");
            catalog.format("error.generic", &[])
        }
    };

    respond(ctx, command, content, true).await
}

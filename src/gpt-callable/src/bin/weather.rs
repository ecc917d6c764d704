use gpt_callable::{GptCallable, ParamSpec, ParamType, Signature};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(true)
        .init();

    let signature = Signature::new()
        .param(
            ParamSpec::new("location", ParamType::String)
                .description("The city and state, e.g. San Francisco, CA"),
        )
        .param(ParamSpec::new(
            "unit",
            ParamType::enumeration(["celsius", "fahrenheit"]),
        ));

    let get_current_weather = GptCallable::new()
        .description("Get the current weather in a given location")
        .exclude("unit")
        .wrap("get_current_weather", signature, |args| {
            Ok(json!({
                "location": args["location"],
                "temperature": 21,
                "unit": "celsius",
            }))
        })?;

    println!(
        "tool definition:\n{}",
        serde_json::to_string_pretty(get_current_weather.gpt_func())?
    );

    let result = get_current_weather.call(json!({"location": "San Francisco, CA"}))?;
    println!("\ncall result:\n{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}

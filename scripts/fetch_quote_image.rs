//! Quote Image Fetch Script
//!
//! This script allows you to exercise the quote image generation endpoint by
//! providing the endpoint URL, your API token and a quote. The generated
//! image is saved to the current directory.

use std::io::{self, Write};

/// Output file the fetched image is written to.
const OUTPUT_FILE: &str = "quote_image.png";

/// Fetches a generated quote image from the generation endpoint.
///
/// This function sends the same request the bot sends in production: a GET
/// with the quote as a query parameter and the API token as the verbatim
/// Authorization header value. On success the image is written to disk and
/// the `Character` and `Anime` response headers are printed.
///
/// # Parameters
///
/// - `gen_url`: The generation endpoint URL
/// - `api_token`: The credential sent as the Authorization header value
/// - `quote`: The quote text to render
///
/// # Returns
///
/// - `Ok(())`: If the image was fetched and saved
/// - `Err(Box<dyn std::error::Error + Send + Sync>)`: If the request fails or the service declines
async fn fetch_quote_image(
    gen_url: &str,
    api_token: &str,
    quote: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("🚀 Requesting quote image for text: '{}'", quote);

    // The quote parameter is merged into any query the endpoint already carries
    let mut url = url::Url::parse(gen_url)?;
    url.query_pairs_mut().append_pair("quote", quote);
    println!("📍 Target URL: {}", url);

    let client = reqwest::Client::new();
    let request_builder = client
        .get(url)
        .header("Authorization", api_token)
        .header("Content-Type", "application/json");

    println!("📤 Sending GET request to the generation endpoint");
    let response = request_builder.send().await?;
    let status = response.status();
    println!("📊 Received response with status: {}", status);

    if !status.is_success() {
        let body = response.text().await?;
        let description = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|data| {
                data.get("description")
                    .and_then(|value| value.as_str())
                    .map(|text| text.to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());
        println!("❌ The service declined the request!");
        println!("🚨 Status: {}, Description: {}", status, description);
        return Err(format!("Generation endpoint error ({}): {}", status, description).into());
    }

    // The metadata travels in response headers next to the image body
    let character = match response.headers().get("Character") {
        Some(value) => value.to_str()?.to_string(),
        None => {
            println!("❌ Response is missing the Character header!");
            return Err("Missing Character header".into());
        }
    };
    let anime = match response.headers().get("Anime") {
        Some(value) => value.to_str()?.to_string(),
        None => {
            println!("❌ Response is missing the Anime header!");
            return Err("Missing Anime header".into());
        }
    };

    println!("🎭 Character: {}", character);
    println!("🎬 Source: {}", anime);

    let bytes = response.bytes().await?;
    println!("📦 Downloaded {} bytes", bytes.len());

    std::fs::write(OUTPUT_FILE, &bytes)?;
    println!("💾 Image saved to {}", OUTPUT_FILE);
    println!("📝 Suggested caption: {} ({}) #anime", character, anime);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    println!("🖼️ Quote Image Fetch Tool");
    println!("==========================");

    // Get the generation endpoint from the user
    print!("🌐 Enter the generation endpoint URL: ");
    io::stdout().flush()?;
    let mut gen_url = String::new();
    io::stdin().read_line(&mut gen_url)?;
    let gen_url = gen_url.trim();

    if gen_url.is_empty() {
        println!("❌ Endpoint URL cannot be empty!");
        return Err("Endpoint URL is required".into());
    }

    // Validate the endpoint before sending anything to it
    match url::Url::parse(gen_url) {
        Ok(parsed) => {
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                println!("❌ Endpoint must be an http(s) URL!");
                return Err("Endpoint must be an http(s) URL".into());
            }
        }
        Err(e) => {
            println!("❌ Endpoint is not a valid URL: {}", e);
            return Err(format!("Invalid endpoint URL: {}", e).into());
        }
    }

    // Get the API token from the user
    print!("🔑 Enter your API token: ");
    io::stdout().flush()?;
    let mut api_token = String::new();
    io::stdin().read_line(&mut api_token)?;
    let api_token = api_token.trim();

    if api_token.is_empty() {
        println!("❌ API token cannot be empty!");
        return Err("API token is required".into());
    }

    // Get the quote text from the user
    print!("📝 Enter the quote text: ");
    io::stdout().flush()?;
    let mut quote = String::new();
    io::stdin().read_line(&mut quote)?;
    let quote = quote.trim();

    if quote.is_empty() {
        println!("❌ Quote text cannot be empty!");
        return Err("Quote text is required".into());
    }

    println!("📏 Quote length: {} characters", quote.chars().count());

    // Fetch the image
    println!("\n🚀 Fetching your quote image...");
    match fetch_quote_image(gen_url, api_token, quote).await {
        Ok(()) => {
            println!("\n🎉 Success! Your quote image has been saved.");
        }
        Err(e) => {
            println!("\n💥 Failed to fetch quote image: {}", e);
            return Err(e);
        }
    }

    Ok(())
}

//! End-to-end walkthrough: fetch a forest boundary, use its bounding box to
//! pre-filter invasive plant occurrences, refine to the exact boundary, and
//! write the two layers to an interactive map.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use arcquery::map::{LayerStyle, MapPage};
use arcquery::{BoundingBox, Client, WGS84, services, spatial};

const FOREST: &str = "Angeles National Forest";
const OUTPUT: &str = "map.html";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "arcquery=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(error) = run().await {
        tracing::error!(%error, "walkthrough failed");
        std::process::exit(1);
    }
}

async fn run() -> arcquery::Result<()> {
    let client = Client::new()?;

    let boundary =
        services::find_forest(&client, services::FOREST_BOUNDARIES_URL, FOREST).await?;
    tracing::info!(features = boundary.features.len(), forest = FOREST, "fetched boundary");

    let bbox = BoundingBox::from_features(&boundary, WGS84)?;
    tracing::info!(envelope = %bbox.envelope_param(), "derived extent");

    let candidates =
        services::invasive_plants_within(&client, services::INVASIVE_PLANTS_URL, &bbox).await?;
    let candidate_count = candidates.features.len();

    let confirmed = spatial::refine(candidates, &boundary)?;
    tracing::info!(
        candidates = candidate_count,
        confirmed = confirmed.features.len(),
        "refined envelope result against the exact boundary"
    );

    let mut page = MapPage::new(format!("{FOREST}: invasive plants"));
    page.add_layer(
        "Forest boundary",
        &boundary,
        LayerStyle {
            color: "#228833".to_string(),
            ..LayerStyle::default()
        },
    );
    page.add_layer(
        "Invasive plants",
        &confirmed,
        LayerStyle {
            color: "#cc3311".to_string(),
            ..LayerStyle::default()
        },
    );
    page.write_to(OUTPUT)?;

    Ok(())
}

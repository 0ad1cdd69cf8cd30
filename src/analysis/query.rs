use clap::Parser;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub enum Query {
    #[command(about = "List registered regions", alias = "ls")]
    Regions,
    #[command(about = "Area of a region in km²")]
    Area {
        region: Option<String>,
    },
    #[command(
        about = "Register a region from a ring of lon,lat points in the display CRS",
        alias = "new"
    )]
    Draw {
        #[arg(required = true)]
        name: String,
        #[arg(required = true, num_args = 4.., value_name = "LON,LAT")]
        ring: Vec<String>,
        #[arg(long, help = "Reproject only the south-west and north-east corners")]
        corners: bool,
    },
    #[command(about = "Summary statistics for a slope range", alias = "st")]
    Stats {
        region: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
    #[command(about = "Category layers for a slope range", alias = "ly")]
    Layers {
        region: Option<String>,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
    #[command(about = "Write classified segments of a region as GeoJSON", alias = "ex")]
    Export {
        region: Option<String>,
        #[arg(long, default_value = "slopes.geojson")]
        path: String,
        #[arg(long)]
        min: Option<f64>,
        #[arg(long)]
        max: Option<f64>,
    },
    #[command(about = "Slope category legend")]
    Legend,
    #[command(about = "DTM extent in the working and display CRS")]
    Extent,
    #[command(about = "Pipeline table status for a region")]
    Status {
        region: Option<String>,
    },
}

/// Parses `"lon,lat"`.
pub fn point(raw: &str) -> Option<(f64, f64)> {
    let (x, y) = raw.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

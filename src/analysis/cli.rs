//! Interactive REPL over regions and slope tables.
use super::*;
use crate::region::Envelope;
use crate::slope::SlopeRange;
use clap::Parser;
use std::io::Write;

pub struct CLI(API);

impl From<API> for CLI {
    fn from(api: API) -> Self {
        Self(api)
    }
}

impl CLI {
    pub async fn run(&self) -> anyhow::Result<()> {
        log::info!("entering analysis");
        loop {
            print!("> ");
            let ref mut input = String::new();
            std::io::stdout().flush()?;
            if std::io::stdin().read_line(input)? == 0 {
                break;
            }
            match input.trim() {
                "" => continue,
                "quit" => break,
                "exit" => break,
                _ => match self.handle(input).await {
                    Err(e) => eprintln!("{}", e),
                    Ok(_) => continue,
                },
            }
        }
        Ok(())
    }

    async fn handle(&self, input: &str) -> anyhow::Result<()> {
        match Query::try_parse_from(std::iter::once("> ").chain(input.split_whitespace()))? {
            Query::Regions => {
                for info in self.0.regions().await? {
                    println!("{}", info.region);
                }
                Ok(())
            }
            Query::Area { region } => {
                Ok(println!("{:.2} km²", self.0.area(region.as_deref()).await?))
            }
            Query::Draw {
                name,
                ring,
                corners,
            } => {
                let ring = ring
                    .iter()
                    .map(|p| point(p).ok_or_else(|| anyhow::anyhow!("invalid point {:?}", p)))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                let mode = match corners {
                    true => Envelope::Corners,
                    false => Envelope::Ring,
                };
                let info = self.0.draw(&name, &ring, mode).await?;
                Ok(println!("{}", info.region))
            }
            Query::Stats { region, min, max } => {
                let range = min.zip(max).map(|(min, max)| SlopeRange::new(min, max));
                let (corrected, summary) = self.0.summary(region.as_deref(), range).await?;
                if corrected.corrected {
                    println!("range corrected to {}", corrected.range);
                }
                println!("segments {:>12}", summary.count_segments);
                println!("roads    {:>12}", summary.count_distinct_roads);
                println!("min      {:>11.2}%", summary.min);
                println!("max      {:>11.2}%", summary.max);
                println!("mean     {:>11.2}%", summary.mean);
                println!("median   {:>11.2}%", summary.median);
                Ok(())
            }
            Query::Layers { region, min, max } => {
                let range = SlopeRange::new(min.unwrap_or(0.), max.unwrap_or(f64::INFINITY));
                for (category, geometry) in self.0.layers(region.as_deref(), range).await? {
                    let parts = geometry["coordinates"].as_array().map_or(0, Vec::len);
                    println!("{:<18} {:>8} lines", category.label(), parts);
                }
                Ok(())
            }
            Query::Export {
                region,
                path,
                min,
                max,
            } => {
                let range = SlopeRange::new(min.unwrap_or(0.), max.unwrap_or(f64::INFINITY));
                let (collection, summary, histogram) =
                    self.0.export(region.as_deref(), range).await?;
                std::fs::write(&path, serde_json::to_string(&collection)?)?;
                println!(
                    "wrote {} segments of {} roads to {}",
                    summary.count_segments, summary.count_distinct_roads, path
                );
                for (edge, count) in histogram.edges.iter().zip(histogram.counts.iter()) {
                    println!("{:>8.2}% {:>8}", edge, count);
                }
                Ok(())
            }
            Query::Legend => {
                for entry in self.0.legend() {
                    println!("{} {}", entry.color, entry.label);
                }
                Ok(())
            }
            Query::Extent => {
                let extent = self.0.extent().await?;
                let (w, d) = (extent.working, extent.display);
                println!("working [{:.1}, {:.1}, {:.1}, {:.1}]", w.min_x, w.min_y, w.max_x, w.max_y);
                println!("display [{:.5}, {:.5}, {:.5}, {:.5}]", d.min_x, d.min_y, d.max_x, d.max_y);
                Ok(())
            }
            Query::Status { region } => self.0.status(region.as_deref()).await,
        }
    }
}

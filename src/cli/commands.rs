use super::QueryArgs;
use anyhow::{Context, Result};
use moe_cap::comparison::{self, Sufficiency};
use moe_cap::config::{Config, ContextScenario, QueryContext};
use moe_cap::estimators::{self, Bottleneck};
use moe_cap::hardware::HardwareCatalog;
use moe_cap::model::{ModelArchitecture, ModelArchitectureRegistry};
use moe_cap::sweep::{self, DEFAULT_TTFT_INPUT_LENS};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Config and data loaded once per invocation
pub struct Session {
    config: Config,
    models: ModelArchitectureRegistry,
    hardware: HardwareCatalog,
}

impl Session {
    pub fn open(
        config_path: Option<String>,
        models_file: Option<String>,
        hardware_file: Option<String>,
    ) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Config::load(&path).with_context(|| format!("loading config {}", path))?,
            None => Config::default(),
        };
        if models_file.is_some() {
            config.paths.models_file = models_file;
        }
        if hardware_file.is_some() {
            config.paths.hardware_file = hardware_file;
        }

        let models = match config.paths.models_path() {
            Some(path) => ModelArchitectureRegistry::load(&path)?,
            None => ModelArchitectureRegistry::builtin().clone(),
        };
        let hardware = match config.paths.hardware_path() {
            Some(path) => HardwareCatalog::load(&path)?,
            None => HardwareCatalog::builtin().clone(),
        };

        Ok(Self {
            config,
            models,
            hardware,
        })
    }

    fn model(&self, key: Option<&str>) -> Result<&ModelArchitecture> {
        let key = key.unwrap_or(&self.config.query.model);
        Ok(self.models.get(key)?)
    }

    /// Command-line values over config-file values over built-in defaults
    fn query(&self, args: &QueryArgs) -> Result<(&ModelArchitecture, QueryContext)> {
        let mut query = self.config.query.clone();
        if let Some(batch_size) = args.batch_size {
            query.batch_size = batch_size;
        }
        if let Some(slo_ms) = args.slo_ms {
            query.slo_ms = slo_ms;
        }
        if let Some(scenario) = &args.scenario {
            query.scenario = scenario.parse::<ContextScenario>().map_err(anyhow::Error::msg)?;
        }
        let ctx = query.to_context();
        ctx.validate()?;
        Ok((self.model(args.model.as_deref())?, ctx))
    }
}

fn header(title: &str) {
    println!("{}", RULE);
    println!("{}", title);
    println!("{}", RULE);
}

fn describe_query(arch: &ModelArchitecture, ctx: &QueryContext) {
    println!("Model:      {} ({} experts, top-{})", arch.name, arch.num_experts, arch.top_k);
    println!(
        "Query:      batch {} | {} context ({} in / {} out) | SLO {} ms",
        ctx.batch_size, ctx.scenario, ctx.input_len, ctx.output_len, ctx.slo_ms
    );
}

fn mark(sufficiency: Sufficiency) -> &'static str {
    match sufficiency {
        Sufficiency::Sufficient => "✓",
        Sufficiency::Insufficient => "✗",
    }
}

pub fn models(session: &Session) -> Result<()> {
    header("Model Registry");
    println!(
        "{:<18} {:<18} {:>8} {:>6} {:>10} {:>10}  {}",
        "ID", "NAME", "EXPERTS", "TOP-K", "ACTIVE(B)", "TOTAL(B)", "CURVES"
    );
    for arch in session.models.iter() {
        let curves: Vec<&str> = arch.curves.keys().map(|s| s.as_str()).collect();
        let curves = if curves.is_empty() {
            "closed form".to_string()
        } else {
            curves.join(", ")
        };
        println!(
            "{:<18} {:<18} {:>8} {:>6} {:>10.1} {:>10.1}  {}",
            arch.id, arch.name, arch.num_experts, arch.top_k, arch.activated_params_b, arch.total_params_b, curves
        );
    }
    Ok(())
}

pub fn demand(session: &Session, query: QueryArgs, device: Option<String>) -> Result<()> {
    let (arch, ctx) = session.query(&query)?;
    let estimate = estimators::estimate(arch, &ctx)?;

    header("Bandwidth Demand");
    describe_query(arch, &ctx);
    println!();
    println!("Required bandwidth:  {:.2} GB/s ({:?})", estimate.required_bandwidth_gbs, estimate.source);
    println!("Activated weights:   {:.2} GB", estimate.active_param_gb);
    println!("KV cache:            {:.3} GB", estimate.kv_cache_gb);
    println!("Unique experts:      {:.2} of {}", estimate.unique_experts, arch.num_experts);

    if let Some(name) = device {
        let profile = session.hardware.get(&name)?;
        let required = estimate.required_bandwidth_gbs;
        let tpot = estimators::tpot_on_device(arch, profile, &ctx)?;
        println!();
        println!(
            "{} {} ({:.0} GB/s peak): {}",
            mark(comparison::classify(profile, required)),
            profile.name,
            profile.peak_bandwidth_gbs,
            comparison::classify(profile, required)
        );
        match comparison::classify_offload(profile, required) {
            Some(offload) => println!("  Offload over PCIe: {}", offload),
            None => println!("  Offload over PCIe: n/a"),
        }
        println!("  Projected TPOT: {:.1} ms", tpot);
    }
    Ok(())
}

pub fn dense(session: &Session, query: QueryArgs) -> Result<()> {
    let (arch, ctx) = session.query(&query)?;
    let baseline = estimators::closest_batch_size_to_dense(arch, &ctx)?;

    header("Dense Baseline");
    describe_query(arch, &ctx);
    println!();
    println!("Dense bandwidth:        {:.2} GB/s", baseline.dense_bandwidth_gbs);
    println!("Closest MoE batch size: {}", baseline.closest_batch_size);
    Ok(())
}

pub fn devices(session: &Session, query: QueryArgs, only_sufficient: bool, output: Option<String>) -> Result<()> {
    let (arch, ctx) = session.query(&query)?;
    let mut rows = comparison::assess(&session.hardware, arch, &ctx)?;
    if only_sufficient {
        rows.retain(|r| r.sufficiency.is_sufficient());
    }

    header("Device Comparison");
    describe_query(arch, &ctx);
    if let Some(first) = rows.first() {
        println!("Required:   {:.2} GB/s", first.required_bandwidth_gbs);
    }
    println!();
    println!(
        "   {:<16} {:<20} {:>12} {:>10} {:>10} {:>8} {:>6}",
        "DEVICE", "CATEGORY", "PEAK GB/s", "TPOT ms", "TTFT ms", "OFFLOAD", "FITS"
    );
    for row in &rows {
        let ttft = row
            .ttft_ms()
            .map(|t| format!("{:.1}", t))
            .unwrap_or_else(|| "-".to_string());
        let offload = row.offload_sufficiency.map(mark).unwrap_or("-");
        let fits = match row.weights_fit {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        println!(
            "{}  {:<16} {:<20} {:>12.1} {:>10.1} {:>10} {:>8} {:>6}",
            mark(row.sufficiency),
            row.device,
            row.category.to_string(),
            row.peak_bandwidth_gbs,
            row.tpot_ms,
            ttft,
            offload,
            fits
        );
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
        println!("\nResults saved to: {}", path);
    }
    Ok(())
}

pub fn ttft(
    session: &Session,
    model: Option<String>,
    device: Option<String>,
    input_len: Option<u32>,
    batch_size: u32,
) -> Result<()> {
    header("Time To First Token");
    match device {
        Some(name) => {
            let profile = session.hardware.get(&name)?;
            let arch = session.model(model.as_deref())?;
            let lens: Vec<u32> = match input_len {
                Some(len) => vec![len],
                None => DEFAULT_TTFT_INPUT_LENS.to_vec(),
            };
            println!("Device: {} | Model: {} | batch {}", profile.name, arch.name, batch_size);
            println!();
            for point in sweep::ttft_sweep(profile, arch, &lens, batch_size)? {
                match point.estimate {
                    Some(est) => println!(
                        "  {:>6} tokens: {:>10.2} ms ({})",
                        point.input_len,
                        est.ttft_ms,
                        bottleneck_label(est.bottleneck)
                    ),
                    None => println!("  {:>6} tokens: no compute data", point.input_len),
                }
            }
        }
        None => {
            let input_len = input_len.unwrap_or(ContextScenario::FiveK.token_lengths().0);
            println!("Input length: {} tokens | batch {}", input_len, batch_size);
            println!();
            let filter = model.as_deref().map(|key| session.model(Some(key))).transpose()?;
            for row in sweep::ttft_table(&session.hardware, &session.models, input_len, batch_size)? {
                if let Some(arch) = filter {
                    if arch.id != row.model {
                        continue;
                    }
                }
                let value = row
                    .estimate
                    .map(|e| format!("{:.2} ms", e.ttft_ms))
                    .unwrap_or_else(|| "-".to_string());
                println!("  {:<16} {:<18} {:>14}", row.device, row.model, value);
            }
        }
    }
    Ok(())
}

fn bottleneck_label(bottleneck: Bottleneck) -> &'static str {
    match bottleneck {
        Bottleneck::Compute => "compute bound",
        Bottleneck::Memory => "memory bound",
    }
}

pub fn sweep(
    session: &Session,
    query: QueryArgs,
    device: Option<String>,
    device_count: Option<u32>,
    smbu: Option<f64>,
    output: Option<String>,
) -> Result<()> {
    let (arch, ctx) = session.query(&query)?;
    let mut supply = session.config.supply.clone();
    if let Some(name) = device {
        supply.device_bandwidth_gbs = session.hardware.get(&name)?.peak_bandwidth_gbs;
    }
    if let Some(count) = device_count {
        supply.device_count = count;
    }
    if let Some(smbu) = smbu {
        supply.smbu_percent = smbu;
    }

    let rows = sweep::demand_sweep(arch, &ctx, &supply)?;

    header("Batch Size Sweep");
    describe_query(arch, &ctx);
    println!(
        "Supply:     {} x {:.0} GB/s at {:.2}% S-MBU",
        supply.device_count, supply.device_bandwidth_gbs, supply.smbu_percent
    );
    println!();
    println!("   {:>6} {:>14} {:>14} {:>10}", "BATCH", "REQUIRED", "ACHIEVABLE", "EXPERTS");
    for row in &rows {
        let status = if row.meets_demand() { "✓" } else { " " };
        println!(
            "{}  {:>6} {:>14.2} {:>14.2} {:>10.2}",
            status, row.batch_size, row.required_bandwidth_gbs, row.achievable_bandwidth_gbs, row.unique_experts
        );
    }

    if let Some(path) = output {
        std::fs::write(&path, serde_json::to_string_pretty(&rows)?)?;
        println!("\nResults saved to: {}", path);
    }
    Ok(())
}

use lbprobe::cli::{Cli, OutputFormat};
use lbprobe::config::Config;
use lbprobe::core::probe::{DistributionTester, ProbeObservation};
use lbprobe::core::runner::{EXIT_CONFIG, EXIT_OK};
use lbprobe::core::{exit_code, IntegrationGate, ReportRenderer, ScenarioRunner};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match main_impl().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_CONFIG
        }
    };
    std::process::exit(code);
}

async fn main_impl() -> Result<i32, Box<dyn std::error::Error>> {
    let cli = Cli::parse_args();

    // Handle configuration commands
    if cli.init {
        let path = match &cli.config {
            Some(path) => path.clone(),
            None => Config::default_path()?,
        };
        Config::init(&path)?;
        println!("✓ Wrote default configuration to {}", path.display());
        return Ok(EXIT_OK);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.apply_env()?;
    cli.apply_to(&mut config);

    if cli.print {
        config.print()?;
        return Ok(EXIT_OK);
    }

    if cli.check {
        config.check()?;
        println!("✓ Configuration valid");
        return Ok(EXIT_OK);
    }

    let options = config.tester_options()?;
    let gate = if cli.force {
        IntegrationGate::forced(&config.gate.env_var)
    } else {
        IntegrationGate::from_env(&config.gate.env_var)
    };

    let mut tester = DistributionTester::new(options)?;
    if cli.output == OutputFormat::Text {
        let renderer = ReportRenderer::new();
        tester = tester.with_observer(Box::new(move |observation: &ProbeObservation| {
            println!("{}", renderer.render_probe(observation));
        }));
    }

    let runner = ScenarioRunner::new(config, gate);
    let outcomes = runner.run_all(&cli.scenarios(), &mut tester).await;

    let renderer = ReportRenderer::new();
    match cli.output {
        OutputFormat::Text => {
            for outcome in &outcomes {
                let line = renderer.render_outcome(outcome);
                if outcome.passed() {
                    println!("{}", line);
                } else {
                    eprintln!("{}", line);
                }
            }
        }
        OutputFormat::Json => {
            let values: Vec<_> = outcomes.iter().map(|o| renderer.render_json(o)).collect();
            println!("{}", serde_json::to_string_pretty(&values)?);
        }
    }

    Ok(exit_code(&outcomes))
}

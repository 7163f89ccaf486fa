use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use healthai_chat::GeminiChat;
use healthai_cli::{init_tracing, load_settings, training_progress};
use healthai_core::training::TrainingTable;
use healthai_model::{evaluate_holdout, ForestParams, RandomForest};
use healthai_pipeline::DiseasePredictor;

/// HealthAI command line
#[derive(Parser, Debug)]
#[command(name = "healthai")]
#[command(about = "Predict a likely disease from symptoms and show what to do about it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Predict from one or more symptoms, e.g. `healthai predict "skin rash" itching`
    Predict {
        #[arg(required = true)]
        symptoms: Vec<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every symptom the model knows
    Symptoms,
    /// Train the forest and write it to disk
    Train {
        /// Output file (defaults to model.path)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report accuracy on a held-out split of the training table
    Evaluate,
    /// Ask the assistant a question
    Chat { message: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();
    let settings = load_settings()?;

    match cli.command {
        Command::Predict { symptoms, json } => {
            let predictor = DiseasePredictor::initialize_with_progress(&settings, &training_progress(settings.model.n_trees))?;
            let result = predictor.predict(symptoms.as_slice());
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            println!("Disease:     {}", result.disease);
            println!("Confidence:  {}", result.confidence_percent());
            println!("Precision:   {}", result.precision_percent());
            println!("Recognized:  {}", result.symptoms.join(", "));
            println!("Typical:     {}", result.disease_symptoms.join(", "));
            if !result.description.is_empty() {
                println!("\n{}", result.description);
            }
            for (title, items) in [
                ("Medications", &result.medications),
                ("Diets", &result.diets),
                ("Precautions", &result.precautions),
                ("Workouts", &result.workouts),
            ] {
                if !items.is_empty() {
                    println!("\n{title}:");
                    for item in items {
                        println!("  - {item}");
                    }
                }
            }
        }
        Command::Symptoms => {
            let table = TrainingTable::load(Path::new(&settings.data.training), &settings.data.label_column)?;
            for name in table.vocabulary().display_tokens() {
                println!("{name}");
            }
        }
        Command::Train { output } => {
            let output = output
                .or_else(|| settings.model.path.as_ref().map(PathBuf::from))
                .ok_or_else(|| anyhow::anyhow!("no output path: pass --output or set model.path"))?;
            let table = TrainingTable::load(Path::new(&settings.data.training), &settings.data.label_column)?;
            let forest = RandomForest::fit_with_progress(
                &table,
                &ForestParams::from(&settings.model),
                &training_progress(settings.model.n_trees),
            )?;
            forest.save(&output)?;
            println!("Saved {} trees over {} symptoms to {}", forest.trees().len(), forest.features().len(), output.display());
        }
        Command::Evaluate => {
            let table = TrainingTable::load(Path::new(&settings.data.training), &settings.data.label_column)?;
            let report = evaluate_holdout(&table, &ForestParams::from(&settings.model), settings.model.holdout_fraction)?;
            println!(
                "Held-out accuracy: {:.2}% ({} train / {} test rows)",
                report.accuracy * 100.0,
                report.train_rows,
                report.test_rows
            );
        }
        Command::Chat { message } => {
            let chat = GeminiChat::from_settings(&settings.chat)?;
            let reply = tokio::runtime::Runtime::new()?.block_on(chat.reply(&message));
            println!("{reply}");
        }
    }
    Ok(())
}

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use reqwest::{header, Client, Url};
use serde_json::Value;
use shared_types::{
    CreateApplicationRequest, CreateJobRequest, DeleteResponse, Fields, InsertAck, Job,
    JobApplication,
};

#[derive(Parser)]
#[command(name = "portal-cli")]
#[command(about = "CLI for managing jobs and applications via the backend API")]
#[command(
    long_about = "A command-line interface for interacting with the job portal backend.\n\n\
    Supports listing and creating jobs, submitting and withdrawing applications,\n\
    and obtaining a session token to read your own enriched applications."
)]
struct Cli {
    /// Backend server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:3000",
        env = "PORTAL_API_URL"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage job postings
    Jobs {
        #[command(subcommand)]
        action: JobAction,
    },
    /// Manage job applications
    Applications {
        #[command(subcommand)]
        action: ApplicationAction,
    },
    /// Obtain a session token for an email address
    ///
    /// Prints the raw token so it can be passed to `mine --token`.
    Login {
        #[arg(short, long)]
        email: String,
    },
    /// List your own applications, enriched with job details
    Mine {
        #[arg(short, long)]
        email: String,

        /// Session token printed by `login`.
        #[arg(short, long, env = "PORTAL_TOKEN")]
        token: String,
    },
}

#[derive(Subcommand)]
enum JobAction {
    /// List all jobs
    List,

    /// Show a single job as JSON
    Get { id: String },

    /// Create a new job posting
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        company: String,

        #[arg(long)]
        category: Option<String>,

        /// e.g. "Full-time", "Remote"
        #[arg(long)]
        job_type: Option<String>,

        /// Extra document field as key=value. May be repeated.
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
}

#[derive(Subcommand)]
enum ApplicationAction {
    /// List every application (not enriched)
    List,

    /// Submit an application for a job
    Create {
        #[arg(short, long)]
        job_id: String,

        #[arg(short, long)]
        email: String,

        /// Extra document field as key=value. May be repeated.
        #[arg(short, long = "field", value_name = "KEY=VALUE", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },

    /// Withdraw the oldest application for a job
    Delete { job_id: String },
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))
}

/// Join `segments` onto the base URL, percent-encoding each one.
fn endpoint(base_url: &str, segments: &[&str]) -> anyhow::Result<Url> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("invalid base URL: {}", base_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("base URL cannot take a path: {}", base_url))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Render a free-form document field for terminal output.
fn display(value: Option<&Value>, fallback: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => fallback.to_string(),
    }
}

fn into_fields(pairs: Vec<(String, String)>) -> Fields {
    pairs
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let base_url = cli.base_url.as_str();

    match cli.command {
        Commands::Jobs { action } => handle_jobs(&client, base_url, action).await?,
        Commands::Applications { action } => {
            handle_applications(&client, base_url, action).await?
        }
        Commands::Login { email } => login(&client, base_url, &email).await?,
        Commands::Mine { email, token } => mine(&client, base_url, &email, &token).await?,
    }

    Ok(())
}

async fn handle_jobs(client: &Client, base_url: &str, action: JobAction) -> anyhow::Result<()> {
    match action {
        JobAction::List => {
            let jobs: Vec<Job> = client
                .get(endpoint(base_url, &["jobs"])?)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            if jobs.is_empty() {
                println!("No jobs found.");
            }
            for job in jobs {
                println!(
                    "[{}] {} @ {}",
                    job.id,
                    display(job.details.title.as_ref(), "(untitled)"),
                    display(job.details.company.as_ref(), "(unknown)")
                );
            }
        }
        JobAction::Get { id } => {
            let job: Value = client
                .get(endpoint(base_url, &["jobs", id.as_str()])?)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&job)?);
        }
        JobAction::Create {
            title,
            company,
            category,
            job_type,
            fields,
        } => {
            let req = CreateJobRequest {
                title: Some(Value::String(title)),
                company: Some(Value::String(company)),
                category: category.map(Value::String),
                job_type: job_type.map(Value::String),
                extra: into_fields(fields),
            };
            let ack: InsertAck = client
                .post(endpoint(base_url, &["jobs"])?)
                .json(&req)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("Created job: [{}]", ack.inserted_id);
        }
    }

    Ok(())
}

async fn handle_applications(
    client: &Client,
    base_url: &str,
    action: ApplicationAction,
) -> anyhow::Result<()> {
    match action {
        ApplicationAction::List => {
            let applications: Vec<JobApplication> = client
                .get(endpoint(base_url, &["job-applications"])?)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            if applications.is_empty() {
                println!("No applications found.");
            }
            for application in applications {
                println!(
                    "[{}] {} -> job {}",
                    application.id,
                    display(application.details.email.as_ref(), "(no email)"),
                    display(application.details.job_id.as_ref(), "?")
                );
            }
        }
        ApplicationAction::Create {
            job_id,
            email,
            fields,
        } => {
            let req = CreateApplicationRequest {
                job_id: Some(Value::String(job_id)),
                email: Some(Value::String(email)),
                extra: into_fields(fields),
            };
            let ack: InsertAck = client
                .post(endpoint(base_url, &["job-applications"])?)
                .json(&req)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("Created application: [{}]", ack.inserted_id);
        }
        ApplicationAction::Delete { job_id } => {
            let response = client
                .delete(endpoint(base_url, &["job-application", job_id.as_str()])?)
                .send()
                .await?;
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                println!("No application found for job {}", job_id);
                return Ok(());
            }
            let deleted: DeleteResponse = response.error_for_status()?.json().await?;
            println!("{} ({})", deleted.message, deleted.deleted_count);
        }
    }

    Ok(())
}

async fn login(client: &Client, base_url: &str, email: &str) -> anyhow::Result<()> {
    let response = client
        .post(endpoint(base_url, &["jwt"])?)
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await?
        .error_for_status()?;

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .ok_or_else(|| anyhow!("server did not set a session cookie"))?
        .to_str()
        .context("session cookie is not valid UTF-8")?;

    let token = set_cookie
        .split(';')
        .next()
        .and_then(|pair| pair.trim().strip_prefix("token="))
        .ok_or_else(|| anyhow!("unexpected cookie: {}", set_cookie))?;

    println!("{}", token);
    Ok(())
}

async fn mine(client: &Client, base_url: &str, email: &str, token: &str) -> anyhow::Result<()> {
    let applications: Vec<Value> = client
        .get(endpoint(base_url, &["job-application"])?)
        .query(&[("email", email)])
        .header(header::COOKIE, format!("token={}", token))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    if applications.is_empty() {
        println!("No applications found.");
    }
    for application in applications {
        println!(
            "[{}] {} @ {} (job {})",
            display(application.get("id"), "?"),
            display(application.get("title"), "(job not found)"),
            display(application.get("company"), "-"),
            display(application.get("job_id"), "?")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_field() {
        assert_eq!(
            parse_field("resume=https://cv.example/a=b"),
            Ok(("resume".to_string(), "https://cv.example/a=b".to_string()))
        );
        assert!(parse_field("novalue").is_err());
    }

    #[test]
    fn test_endpoint_escapes_ids() {
        let url = endpoint("http://localhost:3000/", &["job-application", "a/b?c"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/job-application/a%2Fb%3Fc"
        );

        let url = endpoint("http://api.example/portal", &["jobs", "J1"]).unwrap();
        assert_eq!(url.as_str(), "http://api.example/portal/jobs/J1");

        assert!(endpoint("not a url", &["jobs"]).is_err());
    }

    #[test]
    fn test_display_renders_non_string_values() {
        assert_eq!(display(Some(&json!("Acme")), "-"), "Acme");
        assert_eq!(display(Some(&json!(["Remote"])), "-"), r#"["Remote"]"#);
        assert_eq!(display(None, "-"), "-");
    }

    #[test]
    fn test_cli_parses_nested_commands() {
        let cli = Cli::try_parse_from([
            "portal-cli",
            "jobs",
            "create",
            "--title",
            "Engineer",
            "--company",
            "Acme",
            "-f",
            "salary=100k",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Jobs {
                action: JobAction::Create { title, fields, .. },
            } => {
                assert_eq!(title, "Engineer");
                assert_eq!(fields, vec![("salary".to_string(), "100k".to_string())]);
            }
            _ => panic!("expected jobs create"),
        }
    }
}

use anyhow::{Context, Result};
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::{json, Value};
use std::path::Path;

/// Interactive tester for a running granary server.
#[derive(Parser)]
#[command(name = "granary-cli")]
struct Args {
    /// API host URL
    #[arg(long, env = "GRANARY_API_URL", default_value = "http://localhost:8000")]
    host: String,

    /// User ID for testing
    #[arg(long, env = "GRANARY_TEST_USER", default_value = "test-user-123")]
    user: String,
}

struct Tester {
    host: String,
    user: String,
    thread_id: Option<String>,
    http: reqwest::blocking::Client,
}

impl Tester {
    fn new(host: String, user: String) -> Self {
        Self {
            host,
            user,
            thread_id: None,
            http: reqwest::blocking::Client::new(),
        }
    }

    fn chat(&mut self, message: &str) -> Result<()> {
        let mut payload = json!({
            "message": message,
            "user_id": self.user,
        });
        if let Some(thread_id) = &self.thread_id {
            payload["thread_id"] = json!(thread_id);
        }

        let data: Value = self
            .http
            .post(format!("{}/chat", self.host))
            .json(&payload)
            .send()?
            .error_for_status()?
            .json()?;

        self.thread_id = data["thread_id"].as_str().map(|s| s.to_string());

        println!("\nAI:");
        println!("{}", data["response"].as_str().unwrap_or(""));

        Ok(())
    }

    fn new_conversation(&mut self) -> Result<()> {
        let data: Value = self
            .http
            .post(format!(
                "{}/new-conversation?user_id={}",
                self.host, self.user
            ))
            .send()?
            .error_for_status()?
            .json()?;

        self.thread_id = data["thread_id"].as_str().map(|s| s.to_string());

        println!("\nNew conversation started!");
        println!("Thread ID: {}", self.thread_id.as_deref().unwrap_or("?"));
        println!("{}", data["response"].as_str().unwrap_or(""));

        Ok(())
    }

    fn upload_url(&self, url: &str, title: Option<&str>) -> Result<()> {
        let mut payload = json!({
            "url": url,
            "user_id": self.user,
        });
        if let Some(title) = title {
            payload["title"] = json!(title);
        }

        let data: Value = self
            .http
            .post(format!("{}/upload-url", self.host))
            .json(&payload)
            .send()?
            .error_for_status()?
            .json()?;

        println!("\nDocument uploaded successfully!");
        println!("Document ID: {}", data["document_id"].as_str().unwrap_or("?"));
        println!("Title: {}", data["title"].as_str().unwrap_or("?"));

        Ok(())
    }

    fn upload_file(&self, path: &str) -> Result<()> {
        let path = Path::new(path);
        if !path.exists() {
            println!("Error: file {} does not exist", path.display());
            return Ok(());
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("invalid file name")?
            .to_string();

        let mime = match path.extension().and_then(|e| e.to_str()) {
            Some("pdf") => "application/pdf",
            Some("txt") | Some("md") => "text/plain",
            other => {
                println!("Error: unsupported file type {:?}", other.unwrap_or(""));
                return Ok(());
            }
        };

        let file_part = reqwest::blocking::multipart::Part::file(path)?
            .file_name(filename)
            .mime_str(mime)?;
        let form = reqwest::blocking::multipart::Form::new()
            .part("file", file_part)
            .text("user_id", self.user.clone());

        let data: Value = self
            .http
            .post(format!("{}/upload-file", self.host))
            .multipart(form)
            .send()?
            .error_for_status()?
            .json()?;

        println!("\nFile uploaded successfully!");
        println!("Document ID: {}", data["document_id"].as_str().unwrap_or("?"));
        println!("Title: {}", data["title"].as_str().unwrap_or("?"));

        Ok(())
    }

    fn list_conversations(&self) -> Result<()> {
        let data: Value = self
            .http
            .get(format!("{}/conversations?user_id={}", self.host, self.user))
            .send()?
            .error_for_status()?
            .json()?;

        let conversations = data["conversations"].as_array().cloned().unwrap_or_default();
        if conversations.is_empty() {
            println!("\nNo conversations found");
            return Ok(());
        }

        println!("\nConversations:");
        for (idx, conversation) in conversations.iter().enumerate() {
            println!(
                "{}. {} - {}",
                idx + 1,
                conversation["conversation_id"].as_str().unwrap_or("?"),
                conversation["title"].as_str().unwrap_or("untitled"),
            );
            if let Some(updated) = conversation["updated_at"].as_str() {
                println!("   Last active: {}", updated);
            }
        }

        Ok(())
    }
}

fn print_welcome() {
    println!("granary API tester");
    println!();
    println!("Type your message to chat. Commands:");
    println!("  /new          Start a new conversation");
    println!("  /url <url>    Upload a document from URL");
    println!("  /file <path>  Upload a local file");
    println!("  /list         List conversations");
    println!("  /exit         Exit the tester");
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut tester = Tester::new(args.host.trim_end_matches('/').to_string(), args.user);

    print_welcome();

    if let Err(e) = tester.new_conversation() {
        println!("Error: {}", e);
    }

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("\nyou> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        let result = if let Some(command) = input.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            match parts.next() {
                Some("exit") => break,
                Some("new") => tester.new_conversation(),
                Some("url") => match parts.next() {
                    Some(url) => {
                        let title = {
                            let rest: Vec<&str> = parts.collect();
                            if rest.is_empty() {
                                None
                            } else {
                                Some(rest.join(" "))
                            }
                        };
                        tester.upload_url(url, title.as_deref())
                    }
                    None => {
                        println!("Error: URL required");
                        Ok(())
                    }
                },
                Some("file") => match parts.next() {
                    Some(path) => tester.upload_file(path),
                    None => {
                        println!("Error: file path required");
                        Ok(())
                    }
                },
                Some("list") => tester.list_conversations(),
                Some(unknown) => {
                    println!("Unknown command: /{}", unknown);
                    Ok(())
                }
                None => Ok(()),
            }
        } else {
            tester.chat(input)
        };

        if let Err(e) = result {
            println!("Error: {}", e);
        }
    }

    println!("Exiting...");

    Ok(())
}

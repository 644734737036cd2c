// src/console.rs
//! Interactive line-oriented front end for the wizard

use anyhow::Result;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use crate::error::{StoreError, ValidationError};
use crate::preview::render_markdown;
use crate::types::resume::Section;
use crate::utils::SourceFile;
use crate::wizard::fields::{step_fields, FieldRef};
use crate::wizard::{Route, Wizard, WizardStep};

pub const HELP: &str = "\
Commands:
  show                      current step and its fields
  set <field> <value>       type into a field (\\n for a new line)
  blur [field]              commit one field, or every pending one
  add [section]             append a blank entry
  remove [section] <index>  remove an entry
  next | back               move between steps (commits first)
  goto <path>               open a route, e.g. /builder/skills
  upload <path>             parse a resume file
  template <id>             choose a template
  job <text>                set the job description
  summary                   generate a summary for the job description
  preview                   render the resume as Markdown
  reset                     clear everything
  help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Set { field: String, value: String },
    Blur(Option<String>),
    Add(Option<Section>),
    Remove { section: Option<Section>, index: usize },
    Next,
    Back,
    Goto(String),
    Upload(PathBuf),
    Template(String),
    Job(String),
    Summary,
    Preview,
    Reset,
    Help,
    Quit,
}

/// Parse one input line. `Ok(None)` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "show" | "ls" => Command::Show,
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .map(|(f, v)| (f, v.trim()))
                .unwrap_or((rest, ""));
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            Command::Set {
                field: field.to_string(),
                value: value.replace("\\n", "\n"),
            }
        }
        "blur" => Command::Blur((!rest.is_empty()).then(|| rest.to_string())),
        "add" => Command::Add(optional_section(rest)?),
        "remove" | "rm" => {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let (section, index) = match parts[..] {
                [index] => (None, index),
                [section, index] => (optional_section(section)?, index),
                _ => return Err("usage: remove [section] <index>".to_string()),
            };
            let index = index
                .parse()
                .map_err(|_| format!("'{}' is not an entry index", index))?;
            Command::Remove { section, index }
        }
        "next" => Command::Next,
        "back" => Command::Back,
        "goto" => Command::Goto(required(rest, "goto <path>")?),
        "upload" => Command::Upload(PathBuf::from(required(rest, "upload <path>")?)),
        "template" => Command::Template(required(rest, "template <id>")?),
        "job" => Command::Job(rest.replace("\\n", "\n")),
        "summary" => Command::Summary,
        "preview" => Command::Preview,
        "reset" => Command::Reset,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command '{}', try 'help'", other)),
    };
    Ok(Some(command))
}

fn optional_section(word: &str) -> Result<Option<Section>, String> {
    if word.is_empty() {
        return Ok(None);
    }
    Section::from_name(word)
        .map(Some)
        .ok_or_else(|| format!("unknown section '{}'", word))
}

fn required(rest: &str, usage: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest.to_string())
    }
}

pub struct Console<W> {
    wizard: Wizard,
    default_template: String,
    out: W,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    pub fn new(wizard: Wizard, default_template: impl Into<String>, out: W) -> Self {
        Self {
            wizard,
            default_template: default_template.into(),
            out,
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn into_parts(self) -> (Wizard, W) {
        (self.wizard, self.out)
    }

    /// Read commands until `quit` or end of input.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();
        self.show().await?;
        self.prompt().await?;

        while let Some(line) = lines.next_line().await? {
            match parse_line(&line) {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command).await?,
                Ok(None) => {}
                Err(message) => self.say(&message).await?,
            }
            self.prompt().await?;
        }

        if let Err(err) = self.wizard.commit() {
            warn!("Uncommitted edits lost on exit: {}", err);
        }
        self.out.flush().await?;
        Ok(())
    }

    /// Run one command. Store failures are reported to the user; only
    /// output errors end the session.
    pub async fn execute(&mut self, command: Command) -> Result<()> {
        debug!("Console command: {:?}", command);
        match self.apply(command).await {
            Ok(()) => Ok(()),
            Err(err) => self.say(&format!("error: {}", err.user_message())).await,
        }
    }

    async fn apply(&mut self, command: Command) -> Result<(), StoreError> {
        match command {
            Command::Show => self.show().await.map_err(io_lost)?,
            Command::Set { field, value } => {
                let step = self.active_step()?;
                let field = FieldRef::parse(step, &field)?;
                self.wizard.input(field, value)?;
            }
            Command::Blur(Some(field)) => {
                let step = self.active_step()?;
                let field = FieldRef::parse(step, &field)?;
                self.wizard.blur(field)?;
            }
            Command::Blur(None) => {
                let committed = self.wizard.commit()?;
                self.say(&format!("committed {} field(s)", committed))
                    .await
                    .map_err(io_lost)?;
            }
            Command::Add(section) => {
                let index = self.wizard.add_entry(section)?;
                self.say(&format!("added entry {}", index)).await.map_err(io_lost)?;
            }
            Command::Remove { section, index } => {
                self.wizard.remove_entry(section, index)?;
                self.show().await.map_err(io_lost)?;
            }
            Command::Next => {
                if !self.wizard.next()? {
                    self.say("already on the last step").await.map_err(io_lost)?;
                }
                self.show().await.map_err(io_lost)?;
            }
            Command::Back => {
                if !self.wizard.back()? {
                    self.say("already on the first step").await.map_err(io_lost)?;
                }
                self.show().await.map_err(io_lost)?;
            }
            Command::Goto(path) => {
                self.wizard.go_to(&path)?;
                self.show().await.map_err(io_lost)?;
            }
            Command::Upload(path) => {
                let file = SourceFile::from_path(&path).await.map_err(|err| {
                    warn!("Cannot read {}: {}", path.display(), err);
                    ValidationError::Rejected(format!(
                        "cannot read {}: {}",
                        path.display(),
                        err
                    ))
                })?;
                let template = self.current_template();
                self.say(&format!("uploading {} ...", file.file_name))
                    .await
                    .map_err(io_lost)?;
                self.wizard
                    .store()
                    .upload_source_document(&file, &template)
                    .await?;
                self.wizard.refresh();
                self.show().await.map_err(io_lost)?;
            }
            Command::Template(id) => {
                self.wizard.store().change_template(&id).await?;
                self.say(&format!("template set to {}", id)).await.map_err(io_lost)?;
            }
            Command::Job(text) => {
                self.wizard.store().set_job_description(&text);
                self.wizard.refresh();
            }
            Command::Summary => {
                self.wizard.commit()?;
                let job = self.wizard.store().snapshot().job_description;
                let summary = self.wizard.store().generate_summary(&job).await?;
                self.wizard.refresh();
                self.say(&summary).await.map_err(io_lost)?;
            }
            Command::Preview => {
                self.wizard.commit()?;
                let markdown = render_markdown(&self.wizard.store().snapshot());
                self.say(&markdown).await.map_err(io_lost)?;
            }
            Command::Reset => {
                self.wizard.store().reset();
                self.wizard.refresh();
                self.say("cleared").await.map_err(io_lost)?;
            }
            Command::Help => self.say(HELP).await.map_err(io_lost)?,
            Command::Quit => {}
        }
        Ok(())
    }

    fn active_step(&self) -> Result<WizardStep, StoreError> {
        self.wizard.step().ok_or_else(|| {
            ValidationError::UnknownField {
                step: self.wizard.location(),
                name: "builder step".to_string(),
            }
            .into()
        })
    }

    fn current_template(&self) -> String {
        self.wizard
            .store()
            .snapshot()
            .template_id
            .unwrap_or_else(|| self.default_template.clone())
    }

    async fn show(&mut self) -> Result<()> {
        let state = self.wizard.store().snapshot();
        let mut text = String::new();

        match self.wizard.route() {
            Route::Landing => text.push_str("Landing page. Try 'goto /builder/contacts'.\n"),
            Route::Templates => text.push_str(&format!(
                "Templates. Current: {}. Use 'template <id>'.\n",
                self.current_template()
            )),
            Route::Builder(step) => {
                let (position, total) = self.wizard.progress().unwrap_or((0, 0));
                text.push_str(&format!("[{}/{}] {}\n", position, total, step.title()));
                for field in step_fields(step, &state.document) {
                    let value = self.wizard.value(field).unwrap_or_default();
                    let marker = match self.wizard.draft() {
                        Some(draft) if draft.pending().any(|(f, _)| *f == field) => "*",
                        _ => " ",
                    };
                    text.push_str(&format!(
                        "{} {:<24} {}\n",
                        marker,
                        field.label(),
                        value.replace('\n', " / ")
                    ));
                }
                if step == WizardStep::Finalize {
                    let missing = self.wizard.incomplete_steps();
                    if missing.is_empty() {
                        text.push_str("Every step is complete. Use 'preview'.\n");
                    } else {
                        let titles: Vec<&str> = missing.iter().map(|s| s.title()).collect();
                        text.push_str(&format!("Still incomplete: {}\n", titles.join(", ")));
                    }
                }
            }
        }
        if state.is_busy() {
            text.push_str("(waiting for the resume service)\n");
        }

        self.out.write_all(text.as_bytes()).await?;
        Ok(())
    }

    async fn prompt(&mut self) -> Result<()> {
        let prompt = format!("{}> ", self.wizard.location());
        self.out.write_all(prompt.as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn say(&mut self, message: &str) -> Result<()> {
        self.out.write_all(message.as_bytes()).await?;
        self.out.write_all(b"\n").await?;
        Ok(())
    }
}

fn io_lost(err: anyhow::Error) -> StoreError {
    ValidationError::Rejected(format!("console output failed: {}", err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ResumeBackend;
    use crate::error::BackendError;
    use crate::store::ResumeStore;
    use crate::types::response::{
        ChangeTemplateResponse, GenerateSummaryResponse, ParsedResumeResponse,
    };
    use crate::types::resume::ResumeDocument;
    use async_trait::async_trait;
    use std::sync::Arc;
    use uuid::Uuid;

    struct EchoBackend;

    #[async_trait]
    impl ResumeBackend for EchoBackend {
        async fn upload_resume(
            &self,
            _file: &SourceFile,
            template_id: &str,
        ) -> Result<ParsedResumeResponse, BackendError> {
            Ok(ParsedResumeResponse {
                resume_id: Uuid::new_v4(),
                template_id: template_id.to_string(),
                data: None,
            })
        }

        async fn change_template(
            &self,
            _resume_id: Uuid,
            template_id: &str,
        ) -> Result<ChangeTemplateResponse, BackendError> {
            Ok(ChangeTemplateResponse {
                template_id: template_id.to_string(),
            })
        }

        async fn generate_summary(
            &self,
            job_description: &str,
            _resume: &ResumeDocument,
        ) -> Result<GenerateSummaryResponse, BackendError> {
            Ok(GenerateSummaryResponse {
                summary: format!("Fit for: {}", job_description),
            })
        }

        async fn fetch_resume(&self, _resume_id: Uuid) -> Result<ParsedResumeResponse, BackendError> {
            Err(BackendError::Transport("not stored".to_string()))
        }
    }

    fn console() -> Console<Vec<u8>> {
        let store = Arc::new(ResumeStore::new(Arc::new(EchoBackend)));
        Console::new(Wizard::new(store), "template_1", Vec::new())
    }

    #[test]
    fn test_parse_set_keeps_spaces_and_newlines() {
        assert_eq!(
            parse_line("set 0.description Built it\\nShipped it"),
            Ok(Some(Command::Set {
                field: "0.description".to_string(),
                value: "Built it\nShipped it".to_string(),
            }))
        );
    }

    #[test]
    fn test_parse_remove_with_and_without_section() {
        assert_eq!(
            parse_line("remove 2"),
            Ok(Some(Command::Remove {
                section: None,
                index: 2
            }))
        );
        assert_eq!(
            parse_line("remove languages 0"),
            Ok(Some(Command::Remove {
                section: Some(Section::Languages),
                index: 0
            }))
        );
        assert!(parse_line("remove x").is_err());
    }

    #[test]
    fn test_parse_blank_and_unknown() {
        assert_eq!(parse_line("   "), Ok(None));
        assert!(parse_line("frobnicate").is_err());
        assert!(parse_line("goto").is_err());
    }

    #[tokio::test]
    async fn test_scripted_session_commits_on_navigation() {
        let mut console = console();
        let script = b"set first_name Ada\nset email ada@example.com\nnext\nquit\nset last_name ignored\n";

        console.run(&script[..]).await.expect("session runs");

        let (wizard, out) = console.into_parts();
        let doc = wizard.store().document();
        assert_eq!(doc.contacts.first_name, "Ada");
        assert_eq!(doc.contacts.email, "ada@example.com");
        assert_eq!(doc.contacts.last_name, "");
        assert_eq!(wizard.location(), "/builder/experience");
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("[2/8] Work experience"));
    }

    #[tokio::test]
    async fn test_errors_are_reported_not_fatal() {
        let mut console = console();
        let script = b"set nonsense 1\nsummary\nset phone 555\n";

        console.run(&script[..]).await.expect("session runs");

        let (wizard, out) = console.into_parts();
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("error:"));
        assert_eq!(wizard.store().document().contacts.phone, "555");
    }

    #[tokio::test]
    async fn test_finalize_lists_incomplete_steps() {
        let mut console = console();
        let script = b"goto /builder/finalize\n";

        console.run(&script[..]).await.expect("session runs");

        let (_, out) = console.into_parts();
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("[8/8] Review & finalize"));
        assert!(out.contains("Still incomplete: Contact details, Work experience"));
    }

    #[tokio::test]
    async fn test_job_then_summary_fills_summary() {
        let mut console = console();
        let script = b"job Rust engineer\nsummary\n";

        console.run(&script[..]).await.expect("session runs");

        let (wizard, out) = console.into_parts();
        assert_eq!(wizard.store().document().summary, "Fit for: Rust engineer");
        assert!(String::from_utf8(out).expect("utf8").contains("Fit for: Rust engineer"));
    }
}

use std::io::{self, Write};

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use taskboard::client::{TaskClient, TaskView};
use taskboard::log;
use taskboard::model::{Status, TaskPatch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    log::setup(EnvFilter::try_from_env("TASKBOARD_LOG"), None);

    let base_url =
        std::env::var("TASKBOARD_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());
    let client = TaskClient::new(&base_url)?;
    let mut view = TaskView::new(client);

    banner(&base_url);
    view.refresh().await;
    render(&view);

    loop {
        prompt();
        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => break,
            "help" => help(),
            "list" => {
                view.refresh().await;
                render(&view);
            }
            "add" => {
                if rest.is_empty() {
                    error_line("usage: add <title>");
                } else {
                    view.set_title_input(rest);
                    view.submit().await;
                    render(&view);
                }
            }
            "desc" => {
                view.set_description_input(rest);
                info_line("description staged for the next add");
            }
            "filter" => {
                view.set_keyword(rest).await;
                render(&view);
            }
            "status" => match parse_status_filter(rest) {
                Ok(status) => {
                    view.set_status(status).await;
                    render(&view);
                }
                Err(msg) => error_line(msg),
            },
            "start" => {
                update_status(&mut view, rest, Status::InProgress).await;
                render(&view);
            }
            "done" => {
                update_status(&mut view, rest, Status::Completed).await;
                render(&view);
            }
            "edit" => {
                let mut args = rest.splitn(2, ' ');
                let id = args.next().unwrap_or("");
                let title = args.next().unwrap_or("").trim();
                match (Uuid::parse_str(id), title.is_empty()) {
                    (Ok(id), false) => {
                        view.edit(
                            &id,
                            TaskPatch {
                                title: Some(title.to_string()),
                                description: None,
                                status: None,
                            },
                        )
                        .await;
                        render(&view);
                    }
                    _ => error_line("usage: edit <id> <new title>"),
                }
            }
            "rm" => match Uuid::parse_str(rest) {
                Ok(id) => {
                    view.remove(&id).await;
                    render(&view);
                }
                Err(_) => error_line("usage: rm <id>"),
            },
            _ => error_line("unknown command, try help"),
        }
    }
    Ok(())
}

async fn update_status(view: &mut TaskView, rest: &str, status: Status) {
    match Uuid::parse_str(rest) {
        Ok(id) => view.set_task_status(&id, status).await,
        Err(_) => error_line("expected a task id"),
    }
}

fn parse_status_filter(rest: &str) -> Result<Option<Status>, &'static str> {
    match rest {
        "" | "all" => Ok(None),
        other => other
            .parse::<Status>()
            .map(Some)
            .map_err(|_| "expected pending, in-progress, completed or all"),
    }
}

fn banner(base_url: &str) {
    println!("Taskboard CLI");
    println!("API: {}", base_url);
    println!("Type help for commands.");
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

fn help() {
    println!("Commands:");
    println!("  help                  Show commands");
    println!("  exit | quit           Exit");
    println!("  list                  Refresh and show the task list");
    println!("  add <title>           Create a task");
    println!("  desc <text>           Stage a description for the next add");
    println!("  filter <keyword>      Filter by title keyword");
    println!("  status <value|all>    Filter by status");
    println!("  start <id>            Mark a task in-progress");
    println!("  done <id>             Mark a task completed");
    println!("  edit <id> <title>     Rename a task");
    println!("  rm <id>               Delete a task");
}

fn render(view: &TaskView) {
    if view.is_loading() {
        println!("loading... (last request failed or is still running)");
    }
    if view.tasks().is_empty() {
        println!("no tasks");
        return;
    }
    for task in view.tasks() {
        println!("[{}] {} - {}", task.status, task.id, task.title);
        if let Some(description) = &task.description {
            println!("    {}", description);
        }
    }
}

fn info_line(msg: &str) {
    println!("{}", msg);
}

fn error_line(msg: &str) {
    eprintln!("error: {}", msg);
}

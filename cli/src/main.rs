mod args;
mod render;

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use taskboard_core::{CreateTodo, Notice, NoticeLevel, Notifier, RemoteApi, TodoStore, UreqTransport};

use crate::args::{CategoryCommand, Cli, Command};

/// Prints notices to stderr and remembers whether any of them was an error,
/// since read failures are reported only through notices.
#[derive(Clone, Default)]
struct ConsoleNotifier {
    failed: Arc<AtomicBool>,
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => eprintln!("{notice}"),
            NoticeLevel::Error => {
                self.failed.store(true, Ordering::SeqCst);
                eprintln!("error: {notice}");
            }
        }
    }
}

async fn run(cli: Cli, store: &TodoStore<UreqTransport>) -> anyhow::Result<()> {
    match cli.command {
        Command::List(args) => {
            store.set_filter(&args.to_patch());
            store.fetch_todos(None).await;
            print!("{}", render::todo_list(&store.todos(), &store.pagination()));
        }
        Command::Show { id } => {
            let todo = store.api().get_todo(id).await?;
            print!("{}", render::todo_detail(&todo));
        }
        Command::Add(args) => {
            let todo = store.create_todo(&CreateTodo::from(args)).await?;
            println!("{}", render::todo_line(&todo));
        }
        Command::Edit(args) => {
            let update = args.to_update();
            if update == Default::default() {
                bail!("nothing to change; pass at least one field flag");
            }
            let todo = store.update_todo(args.id, &update).await?;
            println!("{}", render::todo_line(&todo));
        }
        Command::Toggle { id } => {
            let todo = store.toggle_complete(id).await?;
            println!("{}", render::todo_line(&todo));
        }
        Command::Rm { id } => store.delete_todo(id).await?,
        Command::Category(command) => match command {
            CategoryCommand::List => {
                store.fetch_categories().await;
                print!("{}", render::category_list(&store.categories()));
            }
            CategoryCommand::Add { name, color } => {
                store
                    .create_category(&args::create_category(&name, color.as_deref()))
                    .await?;
                print!("{}", render::category_list(&store.categories()));
            }
            CategoryCommand::Edit { id, name, color } => {
                let update = args::update_category(name.as_deref(), color.as_deref());
                if update == Default::default() {
                    bail!("nothing to change; pass --name or --color");
                }
                store.update_category(id, &update).await?;
                print!("{}", render::category_list(&store.categories()));
            }
            CategoryCommand::Rm { id } => store.delete_category(id).await?,
        },
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.to_config();
    log::debug!("using API at {}", config.base_url);

    let notifier = ConsoleNotifier::default();
    let store = TodoStore::with_notifier(RemoteApi::from_config(&config), notifier.clone());

    // Mutation failures were already announced by the notifier.
    if let Err(err) = run(cli, &store).await {
        log::debug!("command failed: {err:#}");
        if !notifier.failed.load(Ordering::SeqCst) {
            eprintln!("error: {err:#}");
        }
        return ExitCode::FAILURE;
    }
    if notifier.failed.load(Ordering::SeqCst) {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

//! Shell context, command dispatch, and rendering.

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm};
use once_cell::sync::Lazy;
use strsim::levenshtein;
use uuid::Uuid;

use crate::{
    config::{Config, ConfigManager},
    errors::CliError,
    ledger::SpendingCategory,
    session::LedgerSession,
    storage::JsonStore,
    tasks::{TaskNote, TaskSink},
    utils::store_dir,
};

use super::output;

/// How the shell was started: reading from a terminal or from piped input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub(crate) struct CommandEntry {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub(crate) static COMMANDS: Lazy<Vec<CommandEntry>> = Lazy::new(|| {
    vec![
        CommandEntry {
            name: "goals",
            usage: "goals",
            summary: "List active savings goals",
        },
        CommandEntry {
            name: "goal",
            usage: "goal add <name> <target> | fund <name> <amount> | draw <name> <amount> | rm <name>",
            summary: "Create, fund, draw from, or remove a savings goal",
        },
        CommandEntry {
            name: "bills",
            usage: "bills",
            summary: "List upcoming bills",
        },
        CommandEntry {
            name: "bill",
            usage: "bill add <name> <amount> <YYYY-MM-DD> | rm <name>",
            summary: "Add or remove a bill",
        },
        CommandEntry {
            name: "categories",
            usage: "categories",
            summary: "List spending categories and their logs",
        },
        CommandEntry {
            name: "cat",
            usage: "cat add <name> <limit> | limit <name> <new-limit> | rm <name>",
            summary: "Manage spending categories",
        },
        CommandEntry {
            name: "spend",
            usage: "spend add <category> <description> <amount> | rm <category> <index>",
            summary: "Log or remove a spending entry",
        },
        CommandEntry {
            name: "income",
            usage: "income [value]",
            summary: "Show or set monthly income",
        },
        CommandEntry {
            name: "breakdown",
            usage: "breakdown",
            summary: "Show the spending breakdown against income",
        },
        CommandEntry {
            name: "help",
            usage: "help",
            summary: "Show this command list",
        },
        CommandEntry {
            name: "exit",
            usage: "exit",
            summary: "Leave the shell",
        },
    ]
});

pub(crate) fn command_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COMMANDS.iter().map(|entry| entry.name).collect();
    names.push("quit");
    names
}

/// Prints bill reminders the way the task list would receive them.
struct AnnouncingSink;

impl TaskSink for AnnouncingSink {
    fn push_task(&mut self, note: TaskNote) {
        output::info(format!("Task queued: {} (due {})", note.title, note.due));
    }
}

pub struct ShellContext {
    mode: CliMode,
    session: LedgerSession,
    config: Config,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new().load()?;
        output::set_color_output(config.color_output);
        let store = JsonStore::new(store_dir())?;
        let session =
            LedgerSession::open(Box::new(store))?.with_task_sink(Box::new(AnnouncingSink));
        Ok(Self {
            mode,
            session,
            config,
            running: true,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_session(mode: CliMode, session: LedgerSession) -> Self {
        Self {
            mode,
            session,
            config: Config::default(),
            running: true,
        }
    }

    pub(crate) fn prompt(&self) -> String {
        "arcadia> ".to_string()
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        command_names()
    }

    pub(crate) fn report_error(&self, err: CliError) {
        output::error(err);
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode != CliMode::Interactive {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Leave the shell?")
            .default(true)
            .interact()?)
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        args: &[&str],
    ) -> Result<LoopControl, CliError> {
        match command {
            "help" => self.show_help(),
            "exit" | "quit" => return Ok(LoopControl::Exit),
            "income" => self.cmd_income(args)?,
            "goals" => self.render_goals(),
            "goal" => self.cmd_goal(args)?,
            "bills" => self.render_bills(),
            "bill" => self.cmd_bill(args)?,
            "categories" => self.render_categories(),
            "cat" => self.cmd_category(args)?,
            "spend" => self.cmd_spend(args)?,
            "breakdown" => self.render_breakdown(),
            other => self.unknown_command(other),
        }
        Ok(LoopControl::Continue)
    }

    fn unknown_command(&self, raw: &str) {
        let suggestion = command_names()
            .into_iter()
            .map(|name| (levenshtein(raw, name), name))
            .min();
        match suggestion {
            Some((distance, name)) if distance <= 2 => {
                output::warning(format!("Unknown command `{raw}`. Did you mean `{name}`?"));
            }
            _ => output::warning(format!("Unknown command `{raw}`. Try `help`.")),
        }
    }

    fn show_help(&self) {
        output::section("Commands");
        for entry in COMMANDS.iter() {
            output::info(format!("{:<12} {}", entry.name, entry.summary));
            output::info(format!("{:<12} usage: {}", "", entry.usage));
        }
    }

    fn cmd_income(&mut self, args: &[&str]) -> Result<(), CliError> {
        match args {
            [] => {
                let income = self.session.ledger().monthly_income;
                output::info(format!("Monthly income: {}", self.money(income)));
            }
            [value] => {
                let value = parse_amount(value, "income")?;
                self.session.set_income(value)?;
                output::success(format!("Monthly income set to {}.", self.money(value)));
            }
            _ => return Err(usage("income [value]")),
        }
        Ok(())
    }

    fn cmd_goal(&mut self, args: &[&str]) -> Result<(), CliError> {
        match args {
            ["add", name, target] => {
                let target = parse_amount(target, "target amount")?;
                self.session.add_goal(name, target)?;
                output::success(format!("Added goal `{name}`."));
            }
            ["fund", name, amount] => {
                let id = self.resolve_goal(name)?;
                let amount = parse_amount(amount, "amount")?;
                let update = self.session.contribute(id, amount)?;
                if update.reached {
                    output::success(format!("Goal `{name}` reached! It leaves the active list."));
                } else {
                    output::success(format!(
                        "Goal `{name}` now at {}.",
                        self.money(update.current_amount)
                    ));
                }
            }
            ["draw", name, amount] => {
                let id = self.resolve_goal(name)?;
                let amount = parse_amount(amount, "amount")?;
                let update = self.session.withdraw(id, amount)?;
                output::success(format!(
                    "Goal `{name}` now at {}.",
                    self.money(update.current_amount)
                ));
            }
            ["rm", name] => {
                let id = self.resolve_goal(name)?;
                if self.session.remove_goal(id)? {
                    output::success(format!("Removed goal `{name}`."));
                }
            }
            _ => return Err(usage(usage_for("goal"))),
        }
        Ok(())
    }

    fn cmd_bill(&mut self, args: &[&str]) -> Result<(), CliError> {
        match args {
            ["add", name, amount, due] => {
                let amount = parse_amount(amount, "bill amount")?;
                let due = parse_date(due)?;
                let bill = self.session.add_bill(name, amount, due)?;
                output::success(format!(
                    "Added bill `{}`: {} due {}.",
                    bill.name,
                    self.money(bill.amount),
                    bill.due_date
                ));
            }
            ["rm", name] => {
                let id = self.resolve_bill(name)?;
                if self.session.delete_bill(id)? {
                    output::success(format!("Removed bill `{name}`."));
                }
            }
            _ => return Err(usage(usage_for("bill"))),
        }
        Ok(())
    }

    fn cmd_category(&mut self, args: &[&str]) -> Result<(), CliError> {
        match args {
            ["add", name, limit] => {
                let limit = parse_amount(limit, "category limit")?;
                self.session.add_category(name, limit)?;
                output::success(format!("Added category `{name}`."));
            }
            ["limit", name, new_limit] => {
                let new_limit = parse_amount(new_limit, "category limit")?;
                self.session.edit_category_limit(name, new_limit)?;
                output::success(format!(
                    "Category `{name}` limit set to {}.",
                    self.money(new_limit)
                ));
            }
            ["rm", name] => {
                if !self.confirm_removal(&format!("Delete category `{name}` and its log?"))? {
                    return Ok(());
                }
                if self.session.remove_category(name)? {
                    output::success(format!("Removed category `{name}`."));
                }
            }
            _ => return Err(usage(usage_for("cat"))),
        }
        Ok(())
    }

    fn cmd_spend(&mut self, args: &[&str]) -> Result<(), CliError> {
        match args {
            ["add", category, description, amount] => {
                let amount = parse_amount(amount, "spending amount")?;
                self.session.add_spending(category, description, amount)?;
                output::success(format!(
                    "Logged {} against `{category}`.",
                    self.money(amount)
                ));
            }
            ["rm", category, index] => {
                let index: usize = index
                    .parse()
                    .map_err(|_| CliError::Input(format!("`{index}` is not an entry index")))?;
                if self.session.remove_spending(category, index)? {
                    output::success(format!("Removed entry {index} from `{category}`."));
                } else {
                    output::warning(format!("Nothing at index {index} in `{category}`."));
                }
            }
            _ => return Err(usage(usage_for("spend"))),
        }
        Ok(())
    }

    fn render_goals(&self) {
        let goals = &self.session.ledger().goals;
        if goals.is_empty() {
            output::info("No savings goals yet.");
            return;
        }
        output::section("Savings Goals");
        for goal in goals {
            output::info(format!(
                "{}: {} / {} ({:.2}% done)",
                goal.name,
                self.money(goal.current_amount),
                self.money(goal.target_amount),
                goal.percent_complete()
            ));
        }
    }

    fn render_bills(&self) {
        let bills = &self.session.ledger().bills;
        if bills.is_empty() {
            output::info("No upcoming bills!");
            return;
        }
        output::section("Upcoming Bills");
        for bill in bills {
            output::info(format!(
                "{}: {} due {}",
                bill.name,
                self.money(bill.amount),
                bill.due_date
            ));
        }
    }

    fn render_categories(&self) {
        let categories = &self.session.ledger().categories;
        if categories.is_empty() {
            output::info("No spending categories yet.");
            return;
        }
        output::section("Spending Categories");
        for category in categories {
            self.render_category(category);
        }
    }

    fn render_category(&self, category: &SpendingCategory) {
        let marker = if category.is_over_limit() {
            " (limit!)"
        } else {
            ""
        };
        output::info(format!(
            "{}: {} spent / {}{}",
            category.name,
            self.money(category.spent()),
            self.money(category.limit),
            marker
        ));
        for (index, entry) in category.spending.iter().enumerate() {
            output::info(format!(
                "  [{index}] {} {}",
                entry.description,
                self.money(entry.amount)
            ));
        }
    }

    fn render_breakdown(&self) {
        let income = self.session.ledger().monthly_income;
        let breakdown = self.session.breakdown();
        output::section("Spending Breakdown");
        output::info(format!("Monthly income: {}", self.money(income)));
        for category in &breakdown.categories {
            let marker = if category.over_limit { " (limit!)" } else { "" };
            output::info(format!(
                "{}: {} spent / {}{}",
                category.name,
                self.money(category.spent),
                self.money(category.limit),
                marker
            ));
        }
        output::info(format!(
            "Total spent: {} / {} ({:.2}% used)",
            self.money(breakdown.total_spent),
            self.money(income),
            breakdown.percent_used
        ));
        output::info(format!("Unused: {}", self.money(breakdown.unused)));
    }

    fn resolve_goal(&self, raw: &str) -> Result<Uuid, CliError> {
        let ledger = self.session.ledger();
        if let Some(goal) = ledger.goals.iter().find(|goal| goal.name == raw) {
            return Ok(goal.id);
        }
        raw.parse::<Uuid>()
            .map_err(|_| CliError::Input(format!("no goal named `{raw}`")))
    }

    fn resolve_bill(&self, raw: &str) -> Result<Uuid, CliError> {
        let ledger = self.session.ledger();
        if let Some(bill) = ledger.bills.iter().find(|bill| bill.name == raw) {
            return Ok(bill.id);
        }
        raw.parse::<Uuid>()
            .map_err(|_| CliError::Input(format!("no bill named `{raw}`")))
    }

    fn confirm_removal(&self, prompt: &str) -> Result<bool, CliError> {
        if self.mode != CliMode::Interactive {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?)
    }

    fn money(&self, value: f64) -> String {
        format!("{}{}", self.config.currency_symbol, value)
    }
}

fn usage_for(name: &str) -> &'static str {
    COMMANDS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.usage)
        .unwrap_or("help")
}

fn usage(text: &str) -> CliError {
    CliError::Input(format!("usage: {text}"))
}

fn parse_amount(raw: &str, field: &'static str) -> Result<f64, CliError> {
    raw.parse::<f64>()
        .map_err(|_| CliError::Input(format!("{field} `{raw}` is not a number")))
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliError> {
    raw.parse()
        .map_err(|_| CliError::Input(format!("due date `{raw}` must be YYYY-MM-DD")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn context() -> ShellContext {
        let session = LedgerSession::open(Box::new(MemoryStore::new())).expect("open session");
        ShellContext::with_session(CliMode::Script, session)
    }

    #[test]
    fn dispatch_runs_a_goal_flow() {
        let mut ctx = context();
        ctx.dispatch("goal", &["add", "Vacation", "500"]).unwrap();
        ctx.dispatch("goal", &["fund", "Vacation", "200"]).unwrap();
        assert_eq!(ctx.session.ledger().goals[0].current_amount, 200.0);
    }

    #[test]
    fn dispatch_surfaces_validation_errors() {
        let mut ctx = context();
        let err = ctx.dispatch("goal", &["add", "Vacation", "0"]).unwrap_err();
        assert!(matches!(err, CliError::Core(_)));
        assert!(ctx.session.ledger().goals.is_empty());
    }

    #[test]
    fn dispatch_rejects_malformed_numbers() {
        let mut ctx = context();
        let err = ctx
            .dispatch("goal", &["add", "Vacation", "lots"])
            .unwrap_err();
        assert!(matches!(err, CliError::Input(_)));
    }

    #[test]
    fn exit_stops_the_loop() {
        let mut ctx = context();
        assert_eq!(ctx.dispatch("exit", &[]).unwrap(), LoopControl::Exit);
        assert_eq!(ctx.dispatch("quit", &[]).unwrap(), LoopControl::Exit);
    }

    #[test]
    fn script_mode_skips_removal_confirmation() {
        let mut ctx = context();
        ctx.dispatch("cat", &["add", "Groceries", "100"]).unwrap();
        ctx.dispatch("cat", &["rm", "Groceries"]).unwrap();
        assert!(ctx.session.ledger().categories.is_empty());
    }
}

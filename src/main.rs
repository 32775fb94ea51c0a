//! Hears Coach - 终端练习入口
//!
//! 初始化日志与配置，按 上传简历 → 填写职位 → 限时答题 → 查看反馈 的顺序驱动控制器。
//! 答题时可输入 /skip、/time、/report、/quit。设置 INTERVIEW_REPORT_PATH 时把报告快照写成 JSON。
//!
//! ```bash
//! INTERVIEW__LLM__PROVIDER=mock cargo run -- resume.txt
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use hears_coach::config::load_config;
use hears_coach::core::{
    AnswerOutcome, Industry, InterviewLength, JobDetailsForm, SessionView, Stage,
    MAX_EXPERIENCE_YEARS,
};
use hears_coach::llm::create_client;
use hears_coach::{observability, ControllerBuilder, InterviewController, InterviewError, ResetKind};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio_util::sync::CancellationToken;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let cfg = load_config(std::env::var("INTERVIEW_CONFIG").ok().map(PathBuf::from))
        .context("Failed to load configuration")?;
    let sweep_every = Duration::from_secs(cfg.app.sweep_interval_secs.max(1));
    let llm = create_client(&cfg.llm);
    let controller = ControllerBuilder::new(cfg).with_llm(llm.clone()).build();

    let shutdown = CancellationToken::new();
    let sweeper = controller
        .store()
        .clone()
        .spawn_sweeper(sweep_every, shutdown.clone());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let id = controller.open_session(None).await;
    let first_resume = std::env::args().nth(1).map(PathBuf::from);

    let result = run(&controller, &id, &mut input, first_resume).await;

    controller.close_session(&id).await;
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "session sweeper task failed");
    }

    let (prompt_tokens, completion_tokens, total_tokens) = llm.token_usage();
    tracing::info!(prompt_tokens, completion_tokens, total_tokens, "llm token usage");
    result
}

async fn run(
    controller: &InterviewController,
    id: &str,
    input: &mut Input,
    mut resume_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    loop {
        let view = controller.view(id).await?;
        match view.stage {
            Stage::Upload => {
                let path = match resume_path.take() {
                    Some(path) => path,
                    None => match prompt(input, "Resume file (pdf/txt): ").await? {
                        Some(line) if !line.is_empty() => PathBuf::from(line),
                        Some(_) => continue,
                        None => return Ok(()),
                    },
                };
                upload(controller, id, &path).await?;
            }
            Stage::Details => {
                if !details(controller, id, input).await? {
                    return Ok(());
                }
            }
            Stage::Interview => {
                if !interview(controller, id, input).await? {
                    return Ok(());
                }
            }
            Stage::Feedback => {
                print_report(controller, id).await?;
                match after_feedback(input).await? {
                    Some(kind) => {
                        controller.reset(id, kind).await?;
                    }
                    None => return Ok(()),
                }
            }
        }
    }
}

async fn prompt(input: &mut Input, label: &str) -> anyhow::Result<Option<String>> {
    println!("{label}");
    let line = input.next_line().await.context("Failed to read stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

async fn upload(controller: &InterviewController, id: &str, path: &Path) -> anyhow::Result<()> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Could not read {}: {e}", path.display());
            return Ok(());
        }
    };
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match controller.upload_resume(id, bytes, ext).await {
        Ok(_) => println!("Resume loaded."),
        Err(e @ InterviewError::Extraction(_)) => println!("{e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// 选择时长并填写职位信息；返回 false 表示输入结束
async fn details(controller: &InterviewController, id: &str, input: &mut Input) -> anyhow::Result<bool> {
    println!("\nInterview length:");
    for (i, length) in InterviewLength::ALL.iter().enumerate() {
        println!(
            "  {}. {} ({} min, {} questions)",
            i + 1,
            length.label(),
            length.minutes(),
            length.question_count()
        );
    }
    let Some(choice) = prompt(input, "Choose 1-4:").await? else {
        return Ok(false);
    };
    if let Some(length) = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| InterviewLength::ALL.get(n.wrapping_sub(1)).copied())
    {
        controller.select_duration(id, length).await?;
    }

    let mut fields = Vec::with_capacity(5);
    for label in [
        "Job title:",
        "Company:",
        "Job description:",
        "Required experience (years):",
        "Industry (optional):",
    ] {
        match prompt(input, label).await? {
            Some(value) => fields.push(value),
            None => return Ok(false),
        }
    }

    let form = JobDetailsForm {
        title: fields[0].clone(),
        company: fields[1].clone(),
        description: fields[2].clone(),
        required_experience_years: match fields[3].as_str() {
            "" => 0,
            years => years.parse().unwrap_or(MAX_EXPERIENCE_YEARS.saturating_add(1)),
        },
        industry: Industry::from_name(&fields[4]),
    };

    println!("Generating questions...");
    match controller.start_interview(id, form).await {
        Ok(view) => println!(
            "Interview started: {} questions, {} on the clock.",
            view.total_questions, view.remaining_display
        ),
        Err(e) if e.is_retryable() => println!("{e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

/// 答题循环；返回 false 表示输入结束
async fn interview(controller: &InterviewController, id: &str, input: &mut Input) -> anyhow::Result<bool> {
    loop {
        let view = controller.view(id).await?;
        if view.stage != Stage::Interview {
            return Ok(true);
        }
        if view.completed {
            println!("All questions answered. Type /report to see your feedback.");
        } else {
            print_question(&view);
        }

        let Some(line) = prompt(input, ">").await? else {
            return Ok(false);
        };

        let result = match line.as_str() {
            "/quit" => return Ok(false),
            "/time" => {
                println!("Time remaining: {}", view.remaining_display);
                continue;
            }
            "/report" => match controller.request_report(id).await {
                Ok(_) => return Ok(true),
                Err(e) => Err(e),
            },
            "/skip" => controller.skip_question(id).await.map(print_outcome),
            answer => controller.submit_answer(id, answer).await.map(print_outcome),
        };

        match result {
            Ok(()) => {}
            Err(InterviewError::DeadlineExpired) => {
                println!("Time is up! Your answer was not recorded. Moving to feedback.");
                return Ok(true);
            }
            Err(e) if e.is_retryable() => println!("{e}"),
            Err(e) => return Err(e.into()),
        }
    }
}

fn print_question(view: &SessionView) {
    if let Some(q) = &view.current_question {
        println!(
            "\n[{}] Question {} of {} ({:?})\n{}",
            view.remaining_display, q.number, q.total, view.timer_level, q.text
        );
    }
}

fn print_outcome(outcome: AnswerOutcome) {
    println!(
        "\n--- Feedback for question {} ---\n{}",
        outcome.feedback.question_number, outcome.feedback.feedback
    );
}

async fn print_report(controller: &InterviewController, id: &str) -> anyhow::Result<()> {
    let snapshot = controller.snapshot(id).await?;
    println!("\n===== Interview report =====");
    if let Some(job) = &snapshot.job_details {
        println!("{} at {}", job.title, job.company);
    }
    println!(
        "Answered {} of {} questions ({:?})",
        snapshot.responses.iter().filter(|r| !r.skipped).count(),
        snapshot.questions.len(),
        snapshot.completion_reason
    );
    if let Some(overall) = &snapshot.overall_feedback {
        println!("\n{overall}");
    }

    if let Ok(path) = std::env::var("INTERVIEW_REPORT_PATH") {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize report")?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write report to {path}"))?;
        println!("Report saved to {path}");
    }
    Ok(())
}

async fn after_feedback(input: &mut Input) -> anyhow::Result<Option<ResetKind>> {
    loop {
        let Some(choice) = prompt(
            input,
            "\n[r] retry same job  [n] new position  [f] start over  [q] quit",
        )
        .await?
        else {
            return Ok(None);
        };
        match choice.as_str() {
            "r" => return Ok(Some(ResetKind::RetrySameJob)),
            "n" => return Ok(Some(ResetKind::NewPosition)),
            "f" => return Ok(Some(ResetKind::FullRestart)),
            "q" => return Ok(None),
            _ => continue,
        }
    }
}

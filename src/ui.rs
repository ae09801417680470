//! Saída de terminal do TalentFlow: spinners e selos coloridos.
//!
//! Usa `indicatif` para o spinner enquanto o transporte responde e `console`
//! para as cores das etapas, vagas e avaliações.

use std::future::Future;
use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::assessments::Assessment;
use crate::jobs::{Job, JobStatus};
use crate::pipeline::{Candidate, Stage};
use crate::transport::{CandidatePage, JobPage};

/// Estilo do selo de cada etapa.
pub fn stage_style(stage: Stage) -> Style {
    match stage {
        Stage::Applied => Style::new().blue(),
        Stage::Screen => Style::new().yellow(),
        Stage::Tech => Style::new().magenta(),
        Stage::Offer => Style::new().green(),
        Stage::Hired => Style::new().green().bold(),
        Stage::Rejected => Style::new().red(),
    }
}

/// Exibe os resultados dos comandos no stdout.
///
/// Mensagens de sucesso saem em verde e falhas em vermelho no stderr.
pub struct Ui {
    // Verde para sucesso e vagas ativas.
    green: Style,
    // Vermelho para falhas.
    red: Style,
    // Esmaecido para rodapés e vagas arquivadas.
    dim: Style,
    // Negrito para títulos.
    bold: Style,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            dim: Style::new().dim(),
            bold: Style::new().bold(),
        }
    }
}

impl Ui {
    /// Executa `fut` atrás de um spinner exibindo `message`.
    pub async fn busy<F: Future>(&self, message: &str, fut: F) -> F::Output {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        let output = fut.await;
        pb.finish_and_clear();
        output
    }

    pub fn success(&self, message: &str) {
        println!("  {} {message}", self.green.apply_to("✓"));
    }

    pub fn failure(&self, message: &str) {
        eprintln!("  {} {message}", self.red.apply_to("✗"));
    }

    pub fn candidate_row(&self, candidate: &Candidate) -> String {
        format!(
            "{:>6}  {:<22} {:<34} {:<10} job {}",
            candidate.id,
            candidate.name,
            candidate.email,
            stage_style(candidate.stage).apply_to(candidate.stage),
            candidate.job_id,
        )
    }

    pub fn print_candidate_page(&self, page: &CandidatePage) {
        if page.candidates.is_empty() {
            println!("{}", self.dim.apply_to("No candidates match."));
        }
        for candidate in &page.candidates {
            println!("{}", self.candidate_row(candidate));
        }
        let more = if page.has_more { ", more available" } else { "" };
        println!(
            "{}",
            self.dim.apply_to(format!(
                "page {} · {} shown of {}{more}",
                page.page,
                page.candidates.len(),
                page.total
            ))
        );
    }

    pub fn print_candidate(&self, candidate: &Candidate) {
        println!("{}", self.bold.apply_to(&candidate.name));
        println!("  id       {}", candidate.id);
        println!("  email    {}", candidate.email);
        println!("  job      {}", candidate.job_id);
        println!("  stage    {}", stage_style(candidate.stage).apply_to(candidate.stage));
        println!("  applied  {}", candidate.applied_at.format("%Y-%m-%d %H:%M UTC"));

        if !candidate.stage_history.is_empty() {
            println!();
            println!("{}", self.bold.apply_to("Timeline"));
            for change in &candidate.stage_history {
                println!(
                    "  {}  {} → {}",
                    change.at.format("%Y-%m-%d %H:%M"),
                    stage_style(change.from).apply_to(change.from),
                    stage_style(change.to).apply_to(change.to),
                );
            }
        }

        println!();
        println!("{}", self.bold.apply_to("Notes"));
        if candidate.notes.is_empty() {
            println!("  {}", self.dim.apply_to("No notes yet"));
        }
        for note in &candidate.notes {
            println!("  {}", note.content);
            println!(
                "    {}",
                self.dim.apply_to(format!(
                    "{} · {}",
                    note.author,
                    note.created_at.format("%Y-%m-%d")
                ))
            );
        }
    }

    pub fn print_board(&self, board: &[(Stage, Vec<Candidate>)]) {
        let total: usize = board.iter().map(|(_, column)| column.len()).sum();
        for (stage, column) in board {
            println!(
                "  {:<10} {:>5}",
                stage_style(*stage).apply_to(stage),
                column.len()
            );
        }
        println!("  {:<10} {:>5}", self.bold.apply_to("total"), total);
    }

    /// Detalhes de uma vaga: slug, status, tags e requisitos.
    pub fn print_job(&self, job: &Job) {
        println!("{}", self.bold.apply_to(&job.title));
        println!("  id        {}", job.id);
        println!("  slug      {}", job.slug);
        println!("  status    {}", self.status_badge(job.status));
        println!("  position  {}", job.order);
        println!("  created   {}", job.created_at.format("%Y-%m-%d"));
        if !job.tags.is_empty() {
            println!("  tags      {}", job.tags.join(", "));
        }
        println!();
        println!("  {}", job.description);
        println!();
        println!("{}", self.bold.apply_to("Requirements"));
        for requirement in &job.requirements {
            println!("  - {requirement}");
        }
    }

    /// Seções e perguntas numeradas; as opções aparecem a partir de 1.
    pub fn print_assessment(&self, assessment: &Assessment) {
        println!(
            "{} {}",
            self.bold.apply_to(&assessment.title),
            self.dim.apply_to(format!(
                "(job {}, {} questions)",
                assessment.job_id,
                assessment.question_count()
            ))
        );
        for section in &assessment.sections {
            println!();
            println!(
                "  {} {}",
                self.bold.apply_to(&section.title),
                self.dim.apply_to(format!("[{}]", section.id))
            );
            if section.questions.is_empty() {
                println!("    {}", self.dim.apply_to("No questions yet"));
            }
            for question in &section.questions {
                let marker = if question.required { "*" } else { " " };
                println!(
                    "   {marker}{} {}",
                    question.question,
                    self.dim.apply_to(format!("({}, {})", question.kind.label(), question.id))
                );
                for (idx, option) in question.options.iter().enumerate() {
                    println!("      {}. {option}", idx + 1);
                }
                if let (Some(min), Some(max)) = (question.min_value, question.max_value) {
                    println!("      {}", self.dim.apply_to(format!("range {min}..={max}")));
                }
                if let Some(max_length) = question.max_length {
                    println!("      {}", self.dim.apply_to(format!("max {max_length} chars")));
                }
            }
        }
    }

    pub fn print_job_page(&self, page: &JobPage) {
        if page.jobs.is_empty() {
            println!("{}", self.dim.apply_to("No jobs match."));
        }
        for job in &page.jobs {
            println!("{}", self.job_row(job));
        }
        println!(
            "{}",
            self.dim.apply_to(format!(
                "page {} of {} · {} jobs",
                page.page,
                page.total_pages.max(1),
                page.total
            ))
        );
    }

    fn job_row(&self, job: &Job) -> String {
        format!(
            "{:>3}. {:<28} {:<9} {}",
            job.order,
            job.title,
            self.status_badge(job.status),
            self.dim.apply_to(job.tags.join(", "))
        )
    }

    fn status_badge(&self, status: JobStatus) -> console::StyledObject<JobStatus> {
        match status {
            JobStatus::Active => self.green.apply_to(status),
            JobStatus::Archived => self.dim.apply_to(status),
        }
    }
}

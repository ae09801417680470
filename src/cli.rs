//! Interface de linha de comando do TalentFlow baseada em clap.
//!
//! Define a struct [`Cli`] com os subcomandos [`Command`] e
//! [`AssessmentCommand`] e as flags globais (--snapshot, --latency-ms,
//! --verbose).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::assessments::{Question, QuestionEdit, QuestionType};
use crate::jobs::{JobDraft, JobPatch, JobSort, JobStatus};
use crate::pipeline::Stage;

/// TalentFlow: acompanha candidatos ao longo do funil de contratação.
#[derive(Debug, Parser)]
#[command(name = "talentflow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Arquivo de snapshot com vagas, candidatos e avaliações.
    #[arg(long, global = true)]
    pub snapshot: Option<PathBuf>,

    /// Latência artificial do transporte em milissegundos.
    #[arg(long, global = true)]
    pub latency_ms: Option<u64>,

    /// Habilita logs de depuração no stderr.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Nomes de etapa aceitos na linha de comando.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StageArg {
    Applied,
    Screen,
    Tech,
    Offer,
    Hired,
    Rejected,
}

impl From<StageArg> for Stage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Applied => Stage::Applied,
            StageArg::Screen => Stage::Screen,
            StageArg::Tech => Stage::Tech,
            StageArg::Offer => Stage::Offer,
            StageArg::Hired => Stage::Hired,
            StageArg::Rejected => Stage::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum JobStatusArg {
    Active,
    Archived,
}

impl From<JobStatusArg> for JobStatus {
    fn from(arg: JobStatusArg) -> Self {
        match arg {
            JobStatusArg::Active => JobStatus::Active,
            JobStatusArg::Archived => JobStatus::Archived,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum JobSortArg {
    #[default]
    Order,
    Title,
}

impl From<JobSortArg> for JobSort {
    fn from(arg: JobSortArg) -> Self {
        match arg {
            JobSortArg::Order => JobSort::Order,
            JobSortArg::Title => JobSort::Title,
        }
    }
}

/// Tipos de pergunta aceitos na linha de comando.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum QuestionTypeArg {
    /// Escolha única entre as opções.
    SingleChoice,
    /// Múltipla escolha entre as opções.
    MultiChoice,
    /// Resposta curta em texto.
    #[default]
    ShortText,
    /// Resposta longa em texto.
    LongText,
    /// Valor numérico, opcionalmente entre --min e --max.
    Numeric,
    /// Envio de arquivo.
    FileUpload,
}

impl From<QuestionTypeArg> for QuestionType {
    fn from(arg: QuestionTypeArg) -> Self {
        match arg {
            QuestionTypeArg::SingleChoice => QuestionType::SingleChoice,
            QuestionTypeArg::MultiChoice => QuestionType::MultiChoice,
            QuestionTypeArg::ShortText => QuestionType::ShortText,
            QuestionTypeArg::LongText => QuestionType::LongText,
            QuestionTypeArg::Numeric => QuestionType::Numeric,
            QuestionTypeArg::FileUpload => QuestionType::FileUpload,
        }
    }
}

/// Campos de uma nova pergunta.
#[derive(Debug, Args)]
pub struct QuestionArgs {
    /// Texto da pergunta.
    pub text: String,

    #[arg(long = "type", value_enum, default_value_t = QuestionTypeArg::ShortText)]
    pub kind: QuestionTypeArg,

    /// Marca a pergunta como obrigatória.
    #[arg(long, default_value_t = false)]
    pub required: bool,

    /// Opção de resposta (repetível), só para perguntas de escolha.
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// Valor mínimo, só para perguntas numéricas.
    #[arg(long)]
    pub min: Option<f64>,

    /// Valor máximo, só para perguntas numéricas.
    #[arg(long)]
    pub max: Option<f64>,

    /// Tamanho máximo da resposta, só para perguntas de texto.
    #[arg(long)]
    pub max_length: Option<u32>,
}

impl QuestionArgs {
    /// Monta a pergunta; ajustes que não cabem no tipo são descartados.
    pub fn into_question(self) -> Question {
        let mut question = Question::new(self.kind.into(), &self.text)
            .with_options(self.options)
            .required(self.required);
        question.edit(&QuestionEdit {
            min_value: self.min,
            max_value: self.max,
            max_length: self.max_length,
            ..Default::default()
        });
        question
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lista candidatos filtrando por nome/email e etapa.
    List {
        /// Trecho do nome ou email, sem diferenciar maiúsculas.
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, value_enum)]
        stage: Option<StageArg>,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long)]
        page_size: Option<u32>,

        /// Filtra o snapshot local sem passar pelo transporte.
        #[arg(long, default_value_t = false)]
        cached: bool,
    },

    /// Mostra a contagem de candidatos por etapa.
    Board,

    /// Mostra um candidato com notas e histórico de etapas.
    Show { id: String },

    /// Move um candidato para a próxima etapa.
    Advance { id: String },

    /// Define a etapa de um candidato (por exemplo, rejeitar).
    SetStage {
        id: String,
        /// Uma de applied, screen, tech, offer, hired, rejected.
        stage: String,
    },

    /// Adiciona uma nota a um candidato.
    Note {
        id: String,
        content: String,

        #[arg(long)]
        author: Option<String>,
    },

    /// Lista vagas.
    Jobs {
        #[arg(long, default_value = "")]
        search: String,

        #[arg(long, value_enum)]
        status: Option<JobStatusArg>,

        #[arg(long, value_enum, default_value_t = JobSortArg::Order)]
        sort: JobSortArg,

        #[arg(long, default_value_t = 1)]
        page: u32,

        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },

    /// Mostra os detalhes de uma vaga.
    Job { id: String },

    /// Cria uma vaga. O slug é derivado do título quando omitido.
    JobCreate(JobCreateArgs),

    /// Altera campos de uma vaga. Campos omitidos ficam como estão.
    JobUpdate(JobUpdateArgs),

    /// Arquiva uma vaga ativa ou reativa uma arquivada.
    JobArchive { id: String },

    /// Move uma vaga de uma posição do quadro para outra.
    ReorderJob { from: u32, to: u32 },

    /// Monta e edita a avaliação de uma vaga.
    Assessment {
        #[command(subcommand)]
        action: AssessmentCommand,
    },

    /// Substitui o snapshot por um conjunto de dados recém-gerado.
    Seed {
        #[arg(long)]
        count: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,
    },
}

#[derive(Debug, Args)]
pub struct JobCreateArgs {
    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<JobStatusArg>,

    #[arg(long, default_value = "")]
    pub description: String,

    /// Requisito da vaga (repetível).
    #[arg(long = "requirement")]
    pub requirements: Vec<String>,

    /// Tag da vaga (repetível).
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl From<JobCreateArgs> for JobDraft {
    fn from(args: JobCreateArgs) -> Self {
        JobDraft {
            title: args.title,
            slug: args.slug.unwrap_or_default(),
            status: args.status.map(Into::into).unwrap_or_default(),
            description: args.description,
            requirements: args.requirements,
            tags: args.tags,
        }
    }
}

#[derive(Debug, Args)]
pub struct JobUpdateArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub slug: Option<String>,

    #[arg(long, value_enum)]
    pub status: Option<JobStatusArg>,

    #[arg(long)]
    pub description: Option<String>,

    /// Substitui os requisitos (repetível).
    #[arg(long = "requirement")]
    pub requirements: Vec<String>,

    /// Substitui as tags (repetível).
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

impl JobUpdateArgs {
    /// Separa o id do patch. Listas vazias não alteram nada.
    pub fn into_patch(self) -> (String, JobPatch) {
        let patch = JobPatch {
            title: self.title,
            slug: self.slug,
            status: self.status.map(Into::into),
            description: self.description,
            requirements: (!self.requirements.is_empty()).then_some(self.requirements),
            tags: (!self.tags.is_empty()).then_some(self.tags),
        };
        (self.id, patch)
    }
}

#[derive(Debug, Subcommand)]
pub enum AssessmentCommand {
    /// Mostra a avaliação de uma vaga.
    Show { job_id: String },

    /// Cria a avaliação de uma vaga com uma primeira pergunta.
    New {
        job_id: String,

        /// Título da avaliação.
        #[arg(long)]
        title: String,

        #[command(flatten)]
        question: QuestionArgs,
    },

    /// Renomeia a avaliação.
    Title { job_id: String, title: String },

    /// Adiciona uma seção ao final.
    AddSection {
        job_id: String,

        /// Título da seção; "Section N" quando omitido.
        #[arg(long)]
        title: Option<String>,
    },

    RenameSection {
        job_id: String,
        section_id: String,
        title: String,
    },

    /// Remove uma seção e suas perguntas. A última seção não pode sair.
    RemoveSection { job_id: String, section_id: String },

    /// Adiciona uma pergunta, por padrão na última seção.
    AddQuestion {
        job_id: String,

        #[arg(long)]
        section: Option<String>,

        #[command(flatten)]
        question: QuestionArgs,
    },

    /// Altera uma pergunta. Campos omitidos ficam como estão.
    EditQuestion {
        job_id: String,
        question_id: String,

        #[arg(long)]
        text: Option<String>,

        #[arg(long = "type", value_enum)]
        kind: Option<QuestionTypeArg>,

        #[arg(long)]
        required: Option<bool>,

        #[arg(long)]
        min: Option<f64>,

        #[arg(long)]
        max: Option<f64>,

        #[arg(long)]
        max_length: Option<u32>,
    },

    RemoveQuestion { job_id: String, question_id: String },

    /// Adiciona uma opção a uma pergunta de escolha.
    AddOption {
        job_id: String,
        question_id: String,
        text: String,
    },

    /// Remove a opção de número `index` (começando em 1).
    RemoveOption {
        job_id: String,
        question_id: String,

        #[arg(value_parser = clap::value_parser!(u64).range(1..))]
        index: u64,
    },
}

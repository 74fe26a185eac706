use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::attack::{AttackConfiguration, Engine};
use crate::cipher::{Mode, Padding, derive_key, shared_registry};
use crate::config::{DEFAULT_CHARSET, DEFAULT_CHUNK_SIZE, DEFAULT_MASK, DEFAULT_PASSWORD_LENGTH, PROGRESS_QUEUE_SIZE};
use crate::secret::Password;
use crate::target::{Target, write_file};
use crate::types::{AttackKind, AttackProgress, AttackResult, DerivationMethod, HardwareAcceleration, OptimizationLevel};
use crate::ui::progress::Bar;

#[derive(Args)]
pub struct AttackArgs {
    /// Encrypted file to attack.
    #[arg(short, long, conflicts_with = "hex")]
    target: Option<PathBuf>,

    /// Hex-encoded ciphertext to attack instead of a file.
    #[arg(long)]
    hex: Option<String>,

    #[arg(short, long, default_value_t = AttackKind::BruteForce)]
    kind: AttackKind,

    #[arg(long, default_value_t = DEFAULT_PASSWORD_LENGTH)]
    max_length: usize,

    #[arg(long, default_value = DEFAULT_CHARSET)]
    charset: String,

    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    #[arg(long)]
    rainbow_table: Option<PathBuf>,

    #[arg(short, long)]
    rules: Option<PathBuf>,

    #[arg(short, long, default_value = DEFAULT_MASK)]
    mask: String,

    /// Worker threads (defaults to the available parallelism).
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Read buffer size for word lists, in bytes.
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[arg(long, default_value_t = OptimizationLevel::High)]
    optimization: OptimizationLevel,

    #[arg(long, default_value_t = HardwareAcceleration::CpuOnly)]
    acceleration: HardwareAcceleration,

    #[arg(long, default_value_t = DerivationMethod::Sha256Simple)]
    derivation: DerivationMethod,

    /// Do not try capitalized and suffixed common passwords.
    #[arg(long)]
    no_smart_patterns: bool,

    /// Do not try common passwords before brute force.
    #[arg(long)]
    no_common_first: bool,

    /// Skip ECB and algorithms with keys shorter than 128 bits.
    #[arg(long)]
    skip_weak: bool,

    /// Only accept decryptions that look like text.
    #[arg(long)]
    verify_plaintext: bool,
}

impl AttackArgs {
    fn into_configuration(self) -> Result<AttackConfiguration> {
        let mut builder = AttackConfiguration::builder(self.kind)
            .max_password_length(self.max_length)
            .charset(self.charset)
            .mask(self.mask)
            .chunk_size(self.chunk_size)
            .optimization(self.optimization)
            .acceleration(self.acceleration)
            .derivation(self.derivation)
            .smart_patterns(!self.no_smart_patterns)
            .common_passwords_first(!self.no_common_first)
            .skip_weak_combinations(self.skip_weak)
            .verify_plaintext(self.verify_plaintext);

        match (self.target, self.hex) {
            (Some(path), _) => builder = builder.target(Target::file(path)),
            (None, Some(blob)) => builder = builder.target(Target::from_hex(&blob)?),
            (None, None) => {}
        }

        if let Some(threads) = self.threads {
            builder = builder.threads(threads);
        }
        if let Some(path) = self.dictionary {
            builder = builder.dictionary(path);
        }
        if let Some(path) = self.rainbow_table {
            builder = builder.rainbow_table(path);
        }
        if let Some(path) = self.rules {
            builder = builder.rules(path);
        }

        Ok(builder.build())
    }
}

#[derive(Args)]
pub struct CipherArgs {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long)]
    output: PathBuf,

    #[arg(short, long)]
    password: String,

    #[arg(short, long, default_value = "AES")]
    algorithm: String,

    #[arg(short, long, default_value_t = Mode::Cbc)]
    mode: Mode,

    #[arg(long, default_value_t = Padding::Pkcs5)]
    padding: Padding,

    #[arg(long, default_value_t = DerivationMethod::Sha256Simple)]
    derivation: DerivationMethod,

    /// Key length in bytes (defaults to the algorithm's primary length).
    #[arg(long)]
    key_length: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Recover the password of an encrypted target.
    Attack(Box<AttackArgs>),

    /// Guess how a file was encrypted.
    Analyze {
        #[arg(short, long)]
        target: PathBuf,
    },

    /// List the registered cipher descriptors.
    Algorithms,

    /// Encrypt a file with a known password.
    Encrypt(CipherArgs),

    /// Decrypt a file with a known password.
    Decrypt(CipherArgs),
}

#[derive(Parser)]
#[command(name = "keyhound", version, about = "Recover passwords of encrypted files by trial decryption.")]
pub struct App {
    /// Log debug events to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl App {
    pub fn init() -> Result<Self> {
        let app = Self::parse();
        let level = if app.verbose { Level::DEBUG } else { Level::WARN };

        let subscriber = tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).with_file(true).with_line_number(true).finish();
        tracing::subscriber::set_global_default(subscriber)?;

        Ok(app)
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Attack(args) => Self::attack((*args).into_configuration()?).await,
            Commands::Analyze { target } => {
                let engine = Engine::default();
                let analysis = engine.analyze(&Target::file(target));
                crate::ui::show_analysis(&analysis, &engine.suggest(&analysis));
                Ok(())
            }
            Commands::Algorithms => {
                crate::ui::show_algorithms(&shared_registry());
                Ok(())
            }
            Commands::Encrypt(args) => Self::transform(&args, true),
            Commands::Decrypt(args) => Self::transform(&args, false),
        }
    }

    async fn attack(config: AttackConfiguration) -> Result<()> {
        let engine = Arc::new(Engine::default());
        let bar = Bar::new(&config.kind().to_string())?;
        let (tx, rx) = flume::bounded::<AttackProgress>(PROGRESS_QUEUE_SIZE);

        let mut worker = tokio::task::spawn_blocking({
            let engine = Arc::clone(&engine);
            move || {
                // A full queue only means the bar skips a frame.
                let on_progress = move |progress: &AttackProgress| {
                    let _ = tx.try_send(progress.clone());
                };
                engine.run(&config, &on_progress)
            }
        });

        let mut receiving = true;
        let result: AttackResult = loop {
            tokio::select! {
                progress = rx.recv_async(), if receiving => match progress {
                    Ok(progress) => bar.update(&progress),
                    Err(_) => receiving = false,
                },
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for ctrl-c")?;
                    engine.stop();
                }
                joined = &mut worker => break joined.context("attack task failed")?,
            }
        };

        bar.finish();
        crate::ui::show_result(&result);

        Ok(())
    }

    fn transform(args: &CipherArgs, encrypt: bool) -> Result<()> {
        let registry = shared_registry();
        let Some(descriptor) = registry.lookup(&args.algorithm) else {
            bail!("unknown algorithm: {}", args.algorithm);
        };
        if descriptor.algorithm().is_asymmetric() {
            bail!("{} keys cannot be derived from a password", descriptor.name());
        }

        let key_length = args.key_length.unwrap_or_else(|| descriptor.primary_key_length());
        let password = Password::new(&args.password);
        let key = derive_key(password.expose_secret().as_bytes(), key_length, args.derivation)?;

        let input = Target::file(&args.input).read_all()?;
        let output = if encrypt {
            descriptor.encrypt(key.expose_secret(), args.mode, args.padding, &input)
        } else {
            descriptor.decrypt(key.expose_secret(), args.mode, args.padding, &input)
        }
        .with_context(|| format!("{} {}/{}/{} failed: {}", if encrypt { "encryption" } else { "decryption" }, descriptor.name(), args.mode, args.padding, args.input.display()))?;

        write_file(&args.output, &output)?;
        crate::ui::show_written(&args.output, output.len());

        Ok(())
    }
}

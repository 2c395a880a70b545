//! Gestion des bases de données: jetons de vérification d'identité,
//! clés de sécurité enregistrées et emails envoyés.
//!
//! Les jetons restent en mémoire. Les clés et les emails sont sauvegardés
//! en YAML une fois qu'un chemin a été fourni par `load`.

use std::{
    collections::HashMap,
    fs::{create_dir_all, File},
    path::{Path, PathBuf},
    sync::RwLock,
};
use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_yaml::{self, to_writer};

/// Gestion des jetons de vérification d'identité
pub mod token {
    use super::*;
    use std::time::{Duration, Instant};
    use once_cell::sync::Lazy;

    struct IssuedToken {
        username: String,
        expires_at: Instant,
    }

    type Db = HashMap<String, IssuedToken>;
    static DB: Lazy<RwLock<Db>> = Lazy::new(Default::default);

    /// Raisons de refus d'un jeton
    #[derive(Debug, PartialEq, Eq, thiserror::Error)]
    pub enum TokenError {
        #[error("token not found")]
        NotFound,
        #[error("token expired")]
        Expired,
        #[error("token database poisoned")]
        Poisoned,
    }

    pub fn generate(username: &str, ttl: Duration) -> Result<String> {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut db = DB.write().or(Err(anyhow!("DB poisoned")))?;

        // Les jetons expirés ne servent plus à rien.
        let now = Instant::now();
        db.retain(|_, issued| issued.expires_at > now);

        db.insert(
            token.clone(),
            IssuedToken {
                username: username.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(token)
    }

    /// Consomme le jeton et renvoie l'utilisateur auquel il a été émis.
    /// Un jeton ne peut être consommé qu'une seule fois, même expiré.
    pub fn consume(token: &str) -> std::result::Result<String, TokenError> {
        let mut db = DB.write().or(Err(TokenError::Poisoned))?;
        let issued = db.remove(token).ok_or(TokenError::NotFound)?;

        if issued.expires_at <= Instant::now() {
            return Err(TokenError::Expired);
        }

        Ok(issued.username)
    }
}

/// Gestion des clés de sécurité enregistrées
pub mod device {
    use super::*;
    use once_cell::sync::Lazy;

    #[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
    pub struct Device {
        pub key_handle: String,
        pub public_key: String,
        pub app_id: String,
    }

    type Db = HashMap<String, Device>;
    static DB: Lazy<RwLock<Db>> = Lazy::new(Default::default);
    static PATH: OnceCell<PathBuf> = OnceCell::new();

    /// Enregistre (ou remplace) la clé de l'utilisateur.
    pub fn set(username: &str, device: Device) -> Result<()> {
        let mut db = DB.write().or(Err(anyhow!("DB poisoned")))?;
        db.insert(username.to_string(), device);
        save(&db)
    }

    pub fn get(username: &str) -> Option<Device> {
        DB.read().ok()?.get(username).cloned()
    }

    pub fn load(path: &Path) -> Result<()> {
        PATH.set(path.to_path_buf()).or(Err(anyhow!("Devices DB already loaded")))?;
        super::load(&DB, path)
    }

    fn save(db: &Db) -> Result<()> {
        match PATH.get() {
            Some(path) => super::save(db, path),
            None => Ok(()),
        }
    }
}

/// Gestion des emails
pub mod email {
    use super::*;
    use once_cell::sync::Lazy;

    #[derive(Clone, Serialize, Deserialize, Debug)]
    pub struct Email {
        pub pk: u64,
        pub to: String,
        pub subject: String,
        pub body: String,
    }

    #[derive(Default, Serialize, Deserialize)]
    struct Db {
        pub next_pk: u64,
        pub emails: HashMap<u64, Email>,
    }

    static DB: Lazy<RwLock<Db>> = Lazy::new(Default::default);
    static PATH: OnceCell<PathBuf> = OnceCell::new();

    pub fn add(to: &str, subject: &str, body: &str) -> Result<()> {
        let mut db = DB.write().or(Err(anyhow!("DB poisoned")))?;

        let pk = db.next_pk;
        db.next_pk += 1;
        let email = Email {
            pk,
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        };

        db.emails.insert(pk, email);
        save(&db)?;
        Ok(())
    }

    /// Dernier email envoyé à `to`.
    pub fn latest_for(to: &str) -> Option<Email> {
        let db = DB.read().ok()?;
        db.emails
            .values()
            .filter(|email| email.to == to)
            .max_by_key(|email| email.pk)
            .cloned()
    }

    pub fn load(path: &Path) -> Result<()> {
        PATH.set(path.to_path_buf()).or(Err(anyhow!("Emails DB already loaded")))?;
        super::load(&DB, path)
    }

    fn save(db: &Db) -> Result<()> {
        match PATH.get() {
            Some(path) => super::save(db, path),
            None => Ok(()),
        }
    }
}

/// Fonctions de sauvegarde et chargement YAML
fn save<T: Serialize>(db: &T, path: &Path) -> Result<()> {
    // Crée le dossier parent s'il n'existe pas
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            create_dir_all(parent_dir).or(Err(anyhow!("Failed to create directory")))?;
        }
    }

    let file = File::create(path)?;
    to_writer(file, db).or(Err(anyhow!("Failed to serialize DB")))?;
    Ok(())
}

fn load<T: for<'de> Deserialize<'de> + Default>(db: &RwLock<T>, path: &Path) -> Result<()> {
    // Chargement de la base de données depuis le fichier YAML
    let content = match File::open(path) {
        Ok(file) => serde_yaml::from_reader(file).unwrap_or_default(),
        Err(_) => T::default(),
    };

    let mut db = db.write().or(Err(anyhow!("DB poisoned")))?;
    *db = content;
    Ok(())
}

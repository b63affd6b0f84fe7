use std::collections::BTreeMap;
use std::fs;

use memento::config::MemoryConfig;
use memento::error::MemoryError;
use memento::models::CredentialRecord;
use memento::store::MemoryStore;
use memento::vault::VaultReadOutcome;
use speculate2::speculate;

fn record(section: &str, key: &str, value: &str) -> CredentialRecord {
    let mut record = CredentialRecord::new();
    record
        .entry(section.to_string())
        .or_insert_with(BTreeMap::new)
        .insert(key.to_string(), value.to_string());
    record
}

speculate! {
    before {
        let memory_tmp = tempfile::tempdir().expect("Failed to create memory root");
        let project_tmp = tempfile::tempdir().expect("Failed to create project dir");
        let store = MemoryStore::new(MemoryConfig::new(memory_tmp.path()));
        let project = project_tmp.path().to_str().unwrap().to_string();
    }

    describe "write and read" {
        it "roundtrips a record and leaves only the encrypted file" {
            let written = record("Hosting", "LOGIN", "bob");
            store.write_credentials(&project, &written).unwrap();

            match store.read_credentials(&project).unwrap() {
                VaultReadOutcome::Encrypted(read) => assert_eq!(read, written),
                other => panic!("expected encrypted read, got {:?}", other),
            }

            assert!(project_tmp.path().join(".credentials.enc").exists());
            assert!(!project_tmp.path().join(".credentials").exists());
        }

        it "stores ciphertext, not plaintext, on disk" {
            store.write_credentials(&project, &record("general", "TOKEN", "s3cr3t")).unwrap();

            let on_disk = fs::read_to_string(project_tmp.path().join(".credentials.enc")).unwrap();
            assert!(!on_disk.contains("s3cr3t"));
            assert_eq!(on_disk.split(':').count(), 3);
        }

        it "reports missing credentials as a non-error outcome" {
            assert_eq!(store.read_credentials(&project).unwrap(), VaultReadOutcome::Missing);
        }

        it "rejects relative project paths before touching storage" {
            assert!(matches!(
                store.read_credentials("relative/path"),
                Err(MemoryError::Validation(_))
            ));
            assert!(matches!(
                store.write_credentials("relative/path", &CredentialRecord::new()),
                Err(MemoryError::Validation(_))
            ));
        }
    }

    describe "legacy migration" {
        it "migrates a plaintext vault on first read and is idempotent" {
            fs::write(
                project_tmp.path().join(".credentials"),
                "LOGIN=bob\n# Hosting\nHOST=example.com\n",
            ).unwrap();

            let first = store.read_credentials(&project).unwrap();
            let VaultReadOutcome::Migrated(first_record) = first else {
                panic!("expected migrated read");
            };
            assert_eq!(first_record["general"]["LOGIN"], "bob");
            assert_eq!(first_record["Hosting"]["HOST"], "example.com");

            // Plaintext gone, encrypted form present.
            assert!(!project_tmp.path().join(".credentials").exists());
            assert!(project_tmp.path().join(".credentials.enc").exists());

            let second = store.read_credentials(&project).unwrap();
            let VaultReadOutcome::Encrypted(second_record) = second else {
                panic!("expected encrypted read after migration");
            };
            assert_eq!(second_record, first_record);
        }

        it "adds the encrypted filename to an existing gitignore during migration" {
            fs::write(project_tmp.path().join(".gitignore"), "target/\n").unwrap();
            fs::write(project_tmp.path().join(".credentials"), "KEY=value\n").unwrap();

            store.read_credentials(&project).unwrap();

            let gitignore = fs::read_to_string(project_tmp.path().join(".gitignore")).unwrap();
            assert!(gitignore.contains(".credentials.enc"));
        }
    }

    describe "gitignore handling on write" {
        it "appends both credential filenames when the file exists" {
            fs::write(project_tmp.path().join(".gitignore"), "target/").unwrap();

            store.write_credentials(&project, &record("general", "K", "v")).unwrap();

            let gitignore = fs::read_to_string(project_tmp.path().join(".gitignore")).unwrap();
            assert!(gitignore.contains(".credentials\n"));
            assert!(gitignore.contains(".credentials.enc"));
            // Existing content untouched.
            assert!(gitignore.starts_with("target/"));
        }

        it "does not append twice" {
            fs::write(project_tmp.path().join(".gitignore"), "").unwrap();

            store.write_credentials(&project, &record("general", "K", "v")).unwrap();
            store.write_credentials(&project, &record("general", "K", "v2")).unwrap();

            let gitignore = fs::read_to_string(project_tmp.path().join(".gitignore")).unwrap();
            assert_eq!(gitignore.matches(".credentials.enc").count(), 1);
        }

        it "never creates a gitignore" {
            store.write_credentials(&project, &record("general", "K", "v")).unwrap();
            assert!(!project_tmp.path().join(".gitignore").exists());
        }
    }

    describe "unreadable vaults" {
        it "reports a corrupted encrypted file as unreadable, not missing" {
            fs::write(project_tmp.path().join(".credentials.enc"), "aa:bb:cc").unwrap();

            let result = store.read_credentials(&project);
            assert!(matches!(result, Err(MemoryError::VaultUnreadable(_))));
        }

        it "reports a tampered payload as unreadable" {
            store.write_credentials(&project, &record("general", "K", "v")).unwrap();

            let enc_path = project_tmp.path().join(".credentials.enc");
            let payload = fs::read_to_string(&enc_path).unwrap();
            let mut fields: Vec<String> = payload.split(':').map(String::from).collect();
            let mut ct = hex::decode(&fields[2]).unwrap();
            ct[0] ^= 0xff;
            fields[2] = hex::encode(ct);
            fs::write(&enc_path, fields.join(":")).unwrap();

            assert!(matches!(
                store.read_credentials(&project),
                Err(MemoryError::VaultUnreadable(_))
            ));
        }
    }

    describe "project registry" {
        it "remembers projects touched by credential and context writes" {
            store.write_credentials(&project, &record("general", "K", "v")).unwrap();
            store.write_context_file(&project, "# Context\nUse cargo test.").unwrap();

            let known = store.list_known_projects().unwrap();
            assert_eq!(known, vec![project.clone()]);

            let context = fs::read_to_string(project_tmp.path().join("AGENT_CONTEXT.md")).unwrap();
            assert_eq!(context, "# Context\nUse cargo test.");
        }

        it "exports credentials for registered projects" {
            store.write_credentials(&project, &record("Hosting", "LOGIN", "bob")).unwrap();
            make_note_session(&store);

            let container = store.export_memory(true, None).unwrap();

            // Restore into a fresh memory root; the credential record lands
            // back in the original project directory.
            fs::remove_file(project_tmp.path().join(".credentials.enc")).unwrap();
            let fresh_tmp = tempfile::tempdir().unwrap();
            let fresh = MemoryStore::new(MemoryConfig::new(fresh_tmp.path()));
            let summary = fresh.import_memory(&container, None).unwrap();
            assert_eq!(summary.credentials_restored, 1);

            match fresh.read_credentials(&project).unwrap() {
                VaultReadOutcome::Encrypted(read) => {
                    assert_eq!(read["Hosting"]["LOGIN"], "bob");
                }
                other => panic!("expected restored credentials, got {:?}", other),
            }
        }
    }
}

fn make_note_session(store: &MemoryStore) {
    store
        .append_note("exported alongside credentials", None, None)
        .expect("Failed to append note");
}

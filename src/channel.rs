//! Scan files on several threads, all feeding one shared registry.
//!
//! File names go out over a bounded crossbeam channel to a pool of workers.
//! The first worker to fail raises the abort flag, the others stop at their next
//! document, and that first error is what the scan returns.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Receiver;

use crate::error::{Error, Result};
use crate::parser;
use crate::registry::{Accumulator, Registry};
use crate::walker::Walker;

// workers take whole files, so there's no point queueing many
const CHANNEL_SIZE : usize = 64;

/// Totals for a scan.
#[derive(Debug,Clone,Copy,Default,PartialEq,Eq)]
pub struct ScanStats {
  pub files : usize,
  pub documents : u64,
  pub bytes : u64,
}

impl std::ops::AddAssign for ScanStats {
  fn add_assign(&mut self, rhs : Self) {
    self.files += rhs.files;
    self.documents += rhs.documents;
    self.bytes += rhs.bytes;
  }
}

/// Walk every document of every file into `registry`, using up to `workers` threads.
pub fn scan<A : Accumulator>(files : &[PathBuf], workers : usize, walker : &Walker, registry : &Registry<A>) -> Result<ScanStats> {
  let workers = workers.clamp(1, files.len().max(1));
  let abort = AtomicBool::new(false);
  let (tx, rx) = crossbeam::channel::bounded::<&Path>(CHANNEL_SIZE);

  let outcome = crossbeam::scope(|s| {
    let handles = (0..workers)
      .map(|_| {
        let rx = rx.clone();
        let abort = &abort;
        s.spawn(move |_| worker(rx, walker, registry, abort))
      })
      .collect::<Vec<_>>();
    // otherwise a full channel blocks forever once every worker has bailed out
    drop(rx);

    for file in files {
      if abort.load(Ordering::Relaxed) { break }
      // only fails when every worker is gone, and their results say why
      if tx.send(file.as_path()).is_err() { break }
    }
    drop(tx);

    let mut total = ScanStats::default();
    let mut first_err = None;
    for handle in handles {
      match handle.join() {
        Ok(Ok(stats)) => total += stats,
        Ok(Err(err)) => { first_err.get_or_insert(err); }
        Err(_) => { first_err.get_or_insert(Error::WorkerPanic); }
      }
    }
    match first_err {
      Some(err) => Err(err),
      None => Ok(total),
    }
  });

  outcome.unwrap_or(Err(Error::WorkerPanic))
}

fn worker<A : Accumulator>(rx : Receiver<&Path>, walker : &Walker, registry : &Registry<A>, abort : &AtomicBool) -> Result<ScanStats> {
  let mut stats = ScanStats::default();
  for path in rx.iter() {
    if abort.load(Ordering::Relaxed) { break }
    match scan_file(path, walker, registry, abort) {
      Ok(file_stats) => stats += file_stats,
      Err(err) => {
        abort.store(true, Ordering::Relaxed);
        tracing::error!(?path, %err, "scan failed");
        return Err(err)
      }
    }
  }
  Ok(stats)
}

fn scan_file<A : Accumulator>(path : &Path, walker : &Walker, registry : &Registry<A>, abort : &AtomicBool) -> Result<ScanStats> {
  let mut docs = parser::documents(path)?;
  let mut tx = registry;
  let mut documents = 0;
  for doc in docs.by_ref() {
    if abort.load(Ordering::Relaxed) { break }
    let doc = doc?;
    let walked = walker.walk(&doc, &mut tx);
    parser::discard(doc);
    walked?;
    documents += 1;
  }
  let bytes = docs.byte_offset() as u64;
  tracing::debug!(?path, documents, bytes, "scanned");
  Ok(ScanStats{ files: 1, documents, bytes })
}

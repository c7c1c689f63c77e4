use super::Parser;
use crate::options::ParseOptions;
use crate::{Document, Error, ErrorLevel, ErrorType, Source};
use log::debug;
use std::{
    collections::VecDeque,
    path::PathBuf,
    sync::{Arc, Mutex},
};

type Outcome = Result<(Document, Vec<Error>), Error>;
type Queue = Arc<Mutex<VecDeque<(usize, PathBuf)>>>;

fn next_task(queue: &Queue) -> Option<(usize, PathBuf)> {
    match queue.lock() {
        Ok(mut tasks) => tasks.pop_front(),
        Err(poisoned) => poisoned.into_inner().pop_front(),
    }
}

fn sub_worker(id: usize, queue: Queue, options: Arc<ParseOptions>) -> Vec<(usize, Outcome)> {
    let mut outcomes = vec![];
    while let Some((index, path)) = next_task(&queue) {
        debug!("worker {} parsing {}", id, path.display());
        outcomes.push((index, Parser::parse_file(&path, &options)));
    }
    outcomes
}

/// Parses every file in `paths` on [`ParseOptions::worker_count`] threads. Results
/// are returned in the order of `paths`.
pub fn parse_files(paths: &[PathBuf], options: &ParseOptions) -> Vec<Outcome> {
    let queue: Queue = Arc::new(Mutex::new(paths.iter().cloned().enumerate().collect()));
    let options = Arc::new(options.clone());
    let num_threads = options.worker_count().min(paths.len()).max(1);
    let handlers = (1..num_threads)
        .map(|id| {
            let queue = queue.clone();
            let options = options.clone();
            std::thread::spawn(move || sub_worker(id, queue, options))
        })
        .collect::<Vec<_>>();

    let mut slots: Vec<Option<Outcome>> = paths.iter().map(|_| None).collect();
    let own_results = sub_worker(0, queue, options);
    for (index, outcome) in own_results {
        slots[index] = Some(outcome);
    }
    for handler in handlers {
        if let Ok(results) = handler.join() {
            for (index, outcome) in results {
                slots[index] = Some(outcome);
            }
        }
    }
    slots
        .into_iter()
        .zip(paths)
        .map(|(slot, path)| {
            slot.unwrap_or_else(|| {
                Err(Error {
                    msg: format!("Worker parsing {} stopped unexpectedly.", path.display()),
                    src: Source::whole(Arc::new(path.display().to_string())),
                    r#type: ErrorType::Io,
                    level: ErrorLevel::Error,
                })
            })
        })
        .collect()
}

use crate::{
    CompletionReason, Effect, FailureReason, HarvestSession, Msg, Normalizer, Observation,
    PageReport, Phase, RawRecord,
};

/// Pure update function: applies an adapter result to the session and
/// returns the next piece of work.
///
/// Returns `None` when `msg` does not fit the current phase; the session is
/// left untouched in that case. Terminal phases accept nothing.
pub fn update(mut session: HarvestSession, msg: Msg) -> (HarvestSession, Option<Effect>) {
    let effect = match (session.phase.clone(), msg) {
        (Phase::Init, Msg::Start) => {
            session.phase = Phase::Navigating;
            Some(Effect::ResolveSubject)
        }
        (Phase::Navigating, Msg::SubjectResolved(name)) => {
            let name = name.trim().to_string();
            session.normalizer = Some(Normalizer::new(
                session.config.rules.clone(),
                name.clone(),
                session.config.source_id.clone(),
                session.config.captured_on,
            ));
            session.subject_name = Some(name);
            Some(session.enter_page(1))
        }
        (Phase::ExtractingPage, Msg::PageExtracted(raw)) => Some(session.accumulate(&raw)),
        (Phase::Paginating, Msg::NextPageChecked(false)) => {
            let page = session.current_page().unwrap_or(1);
            Some(session.complete(CompletionReason::PagesExhausted { page }))
        }
        (Phase::Paginating, Msg::NextPageChecked(true)) => {
            let to_page = session.current_page().unwrap_or(0) + 1;
            Some(Effect::AdvancePage { to_page })
        }
        (Phase::Paginating, Msg::PageAdvanced) => {
            let next = session.current_page().unwrap_or(0) + 1;
            Some(session.enter_page(next))
        }
        (phase, Msg::AdapterFailed { operation, message }) if !phase.is_terminal() => {
            Some(session.fail(FailureReason::Adapter { operation, message }))
        }
        _ => None,
    };

    (session, effect)
}

impl HarvestSession {
    fn enter_page(&mut self, page: u32) -> Effect {
        self.pages.push(page);
        self.phase = Phase::ExtractingPage;
        Effect::ExtractPage { page }
    }

    fn complete(&mut self, reason: CompletionReason) -> Effect {
        self.phase = Phase::Completed(reason);
        Effect::Complete(reason)
    }

    fn fail(&mut self, reason: FailureReason) -> Effect {
        self.phase = Phase::Failed(reason.clone());
        Effect::Fail(reason)
    }

    fn accumulate(&mut self, raw: &[RawRecord]) -> Effect {
        let page = self.current_page().unwrap_or(1);
        let normalized = match &self.normalizer {
            Some(normalizer) => normalizer.normalize_page(raw),
            None => Vec::new(),
        };

        if normalized.is_empty() && self.config.empty_page_is_error {
            self.record_page(page, raw.len(), 0, 0, Observation::Fresh, false);
            return self.fail(FailureReason::EmptyPage { page });
        }

        let observation = self.detector.observe(&normalized);
        match observation {
            Observation::Exceeded { repeats } => {
                self.record_page(page, raw.len(), normalized.len(), 0, observation, false);
                return self.fail(FailureReason::StalenessExceeded { page, repeats });
            }
            // Content already seen; nothing new to keep or to cut off.
            Observation::Repeated { .. } => {
                self.record_page(page, raw.len(), normalized.len(), 0, observation, false);
                return self.paginate(page);
            }
            Observation::Fresh => {}
        }

        self.phase = Phase::Accumulating;
        let scan = self.config.cutoff.scan(&normalized);
        let admitted = normalized.len();
        self.accumulated
            .extend(normalized.into_iter().take(scan.admitted));
        self.record_page(page, raw.len(), admitted, scan.admitted, observation, scan.triggered);

        if scan.triggered {
            return self.complete(CompletionReason::CutoffReached { page });
        }
        self.paginate(page)
    }

    fn paginate(&mut self, page: u32) -> Effect {
        if self.config.max_pages.is_some_and(|max| page >= max) {
            return self.complete(CompletionReason::PageLimitReached { page });
        }
        self.phase = Phase::Paginating;
        Effect::CheckNextPage
    }

    fn record_page(
        &mut self,
        page: u32,
        raw: usize,
        admitted: usize,
        kept: usize,
        observation: Observation,
        cutoff_triggered: bool,
    ) {
        self.last_page = Some(PageReport {
            page,
            raw,
            admitted,
            kept,
            observation,
            cutoff_triggered,
        });
    }
}

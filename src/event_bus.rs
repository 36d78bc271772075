//! Thread that receives the router's published events and fires the registered handlers.

use crate::events::*;
use crate::logging::Logger;
use std::sync::mpsc::Receiver;
use std::thread;
use std::thread::JoinHandle;

pub(crate) type HandlerPtr<T> = Box<dyn Fn(&T) + Send>;

pub(crate) struct EventHandlers {
    pub(crate) update_app_hash_handlers: Vec<HandlerPtr<UpdateAppHashEvent>>,
    pub(crate) init_chain_handlers: Vec<HandlerPtr<InitChainEvent>>,
    pub(crate) finalize_block_handlers: Vec<HandlerPtr<FinalizeBlockEvent>>,
    pub(crate) commit_handlers: Vec<HandlerPtr<CommitEvent>>,
    pub(crate) save_state_handlers: Vec<HandlerPtr<SaveStateEvent>>,
    pub(crate) skip_empty_block_handlers: Vec<HandlerPtr<SkipEmptyBlockEvent>>,
    pub(crate) check_tx_async_handlers: Vec<HandlerPtr<CheckTxAsyncEvent>>,
}

impl EventHandlers {
    /// Collect the user-defined handlers, plus the default log handler of every event if `log_events`
    /// is set.
    pub(crate) fn new(
        log_events: bool,
        update_app_hash_handler: Option<HandlerPtr<UpdateAppHashEvent>>,
        init_chain_handler: Option<HandlerPtr<InitChainEvent>>,
        finalize_block_handler: Option<HandlerPtr<FinalizeBlockEvent>>,
        commit_handler: Option<HandlerPtr<CommitEvent>>,
        save_state_handler: Option<HandlerPtr<SaveStateEvent>>,
        skip_empty_block_handler: Option<HandlerPtr<SkipEmptyBlockEvent>>,
        check_tx_async_handler: Option<HandlerPtr<CheckTxAsyncEvent>>,
    ) -> EventHandlers {
        EventHandlers {
            update_app_hash_handlers: handlers(log_events, update_app_hash_handler),
            init_chain_handlers: handlers(log_events, init_chain_handler),
            finalize_block_handlers: handlers(log_events, finalize_block_handler),
            commit_handlers: handlers(log_events, commit_handler),
            save_state_handlers: handlers(log_events, save_state_handler),
            skip_empty_block_handlers: handlers(log_events, skip_empty_block_handler),
            check_tx_async_handlers: handlers(log_events, check_tx_async_handler),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.update_app_hash_handlers.is_empty()
            && self.init_chain_handlers.is_empty()
            && self.finalize_block_handlers.is_empty()
            && self.commit_handlers.is_empty()
            && self.save_state_handlers.is_empty()
            && self.skip_empty_block_handlers.is_empty()
            && self.check_tx_async_handlers.is_empty()
    }

    pub(crate) fn fire_handlers(&self, event: Event) {
        match event {
            Event::UpdateAppHash(update_app_hash_event) => self
                .update_app_hash_handlers
                .iter()
                .for_each(|handler| handler(&update_app_hash_event)),

            Event::InitChain(init_chain_event) => self
                .init_chain_handlers
                .iter()
                .for_each(|handler| handler(&init_chain_event)),

            Event::FinalizeBlock(finalize_block_event) => self
                .finalize_block_handlers
                .iter()
                .for_each(|handler| handler(&finalize_block_event)),

            Event::Commit(commit_event) => self
                .commit_handlers
                .iter()
                .for_each(|handler| handler(&commit_event)),

            Event::SaveState(save_state_event) => self
                .save_state_handlers
                .iter()
                .for_each(|handler| handler(&save_state_event)),

            Event::SkipEmptyBlock(skip_empty_block_event) => self
                .skip_empty_block_handlers
                .iter()
                .for_each(|handler| handler(&skip_empty_block_event)),

            Event::CheckTxAsync(check_tx_async_event) => self
                .check_tx_async_handlers
                .iter()
                .for_each(|handler| handler(&check_tx_async_event)),
        }
    }
}

fn handlers<T: Logger>(log_events: bool, user_handler: Option<HandlerPtr<T>>) -> Vec<HandlerPtr<T>> {
    let mut handlers = Vec::new();
    if log_events {
        handlers.push(T::get_logger());
    }
    handlers.extend(user_handler);
    handlers
}

/// Start the event bus thread.
///
/// The thread fires handlers for every event published into `event_subscriber`, in publication order.
/// It exits once every publisher has been dropped and all events already published have been handled.
pub(crate) fn start_event_bus(
    event_handlers: EventHandlers,
    event_subscriber: Receiver<Event>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        while let Ok(event) = event_subscriber.recv() {
            event_handlers.fire_handlers(event)
        }
    })
}

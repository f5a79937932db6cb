//! Rendezvous pipe into a background writer thread
//! 通往后台写线程的会合管道
//!
//! A piped sink hands each payload to [`PipeTx::send`], which returns only
//! once the background [`Task`] has taken it. The task reports its result
//! through a oneshot done signal.
//! 管道型 sink 通过 [`PipeTx::send`] 交付负载，后台 [`Task`] 接收后才返回；
//! 任务经 oneshot 完成信号报告结果。

use std::{
  io::{self, Read},
  sync::{
    Arc,
    mpsc::{Receiver, SyncSender, sync_channel},
  },
  thread::{self, JoinHandle},
};

use log::{debug, warn};
use xbs_compress::Decompressor;
use xbs_stream::Chunk;

use crate::{Error, Result};

/// Largest piece handed over per send 每次交付的最大分片
pub const PIECE: u64 = 64 * 1024;

/// Sending half 发送端
pub struct PipeTx(SyncSender<Vec<u8>>);

/// Receiving half, a blocking [`Read`] ending when the sender is dropped
/// 接收端，阻塞式 [`Read`]，发送端释放后结束
pub struct PipeRx {
  rx: Receiver<Vec<u8>>,
  buf: Vec<u8>,
  pos: usize,
}

pub fn pipe() -> (PipeTx, PipeRx) {
  let (tx, rx) = sync_channel(0);
  (
    PipeTx(tx),
    PipeRx {
      rx,
      buf: Vec::new(),
      pos: 0,
    },
  )
}

impl PipeTx {
  /// Blocks until taken, false once the receiver is gone
  /// 阻塞直到被接收；接收端已释放时返回 false
  #[inline]
  pub fn send(&self, buf: Vec<u8>) -> bool {
    self.0.send(buf).is_ok()
  }
}

impl Read for PipeRx {
  fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
    if out.is_empty() {
      return Ok(0);
    }
    while self.pos == self.buf.len() {
      match self.rx.recv() {
        Ok(buf) => {
          self.buf = buf;
          self.pos = 0;
        }
        Err(_) => return Ok(0),
      }
    }
    let n = out.len().min(self.buf.len() - self.pos);
    out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
    self.pos += n;
    Ok(n)
  }
}

impl PipeRx {
  /// Discard everything until the sender closes
  /// 丢弃所有数据直到发送端关闭
  pub fn drain(&mut self) -> io::Result<u64> {
    io::copy(self, &mut io::sink())
  }
}

/// Fill `buf` as far as the source allows, returns bytes read
/// 尽量填满 `buf`，返回读取字节数
pub fn read_full(src: &mut (impl Read + ?Sized), buf: &mut [u8]) -> io::Result<usize> {
  let mut got = 0;
  while got < buf.len() {
    match src.read(&mut buf[got..]) {
      Ok(0) => break,
      Ok(n) => got += n,
      Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
      Err(e) => return Err(e),
    }
  }
  Ok(got)
}

/// Background thread with a done signal 带完成信号的后台线程
pub struct Task {
  name: Box<str>,
  done: oneshot::Receiver<Result<()>>,
  handle: JoinHandle<()>,
}

impl Task {
  pub fn spawn<F>(name: &str, f: F) -> Result<Self>
  where
    F: FnOnce() -> Result<()> + Send + 'static,
  {
    let (tx, done) = oneshot::channel();
    let handle = thread::Builder::new()
      .name("xbs_pipe".into())
      .spawn(move || {
        let _ = tx.send(f());
      })?;
    Ok(Self {
      name: name.into(),
      done,
      handle,
    })
  }

  /// Block until the task reports 阻塞直到任务报告结果
  pub fn wait(self) -> Result<()> {
    let r = match self.done.recv() {
      Ok(r) => r,
      Err(_) => Err(Error::TaskLost(self.name.clone())),
    };
    if self.handle.join().is_err() {
      warn!("task {} panicked", self.name);
    }
    r
  }
}

/// Payloads piped in wire order to a background consumer
/// 按线上顺序经管道送往后台消费者的负载
pub struct Piped {
  tx: Option<PipeTx>,
  task: Option<Task>,
  next: u64,
}

impl Piped {
  /// Spawn `f` reading the pipe, through `codec` when given
  ///
  /// Once `f` returns `Ok` the rest of the pipe is drained so the sender
  /// never blocks on a finished consumer.
  /// 启动读取管道的 `f`，给定 `codec` 时先解压。`f` 成功返回后排空管道，
  /// 保证发送端不会阻塞在已结束的消费者上。
  pub fn spawn<F>(name: &str, codec: Option<Arc<dyn Decompressor>>, f: F) -> Result<Self>
  where
    F: FnOnce(&mut (dyn Read + Send)) -> Result<()> + Send + 'static,
  {
    let (tx, mut rx) = pipe();
    let task = Task::spawn(name, move || {
      match codec {
        Some(codec) => {
          let mut src = codec.decompress(Box::new(&mut rx))?;
          f(&mut *src)?;
        }
        None => f(&mut rx)?,
      }
      let left = rx.drain()?;
      if left > 0 {
        debug!("pipe drained {left} trailing bytes");
      }
      Ok(())
    })?;
    Ok(Self {
      tx: Some(tx),
      task: Some(task),
      next: 0,
    })
  }

  /// Hand a payload over in pieces of at most [`PIECE`] bytes
  /// 以不超过 [`PIECE`] 字节的分片交付负载
  pub fn feed<R: Read>(&mut self, chunk: &mut Chunk<'_, R>) -> Result<()> {
    if !chunk.sparse().is_empty() {
      return Err(Error::SparseCompressed(chunk.path().into()));
    }
    if chunk.offset() != self.next {
      return Err(Error::Offset {
        expected: self.next,
        actual: chunk.offset(),
      });
    }
    while chunk.left() > 0 {
      // at most PIECE bytes buffered per send
      let mut buf = vec![0u8; chunk.left().min(PIECE) as usize];
      chunk.read_exact(&mut buf)?;
      self.next += buf.len() as u64;

      let sent = self.tx.as_ref().is_some_and(|tx| tx.send(buf));
      if !sent {
        // consumer is gone, surface its error
        return Err(self.stop().err().unwrap_or(Error::PipeClosed));
      }
    }
    Ok(())
  }

  /// Close the pipe and wait for the consumer 关闭管道并等待消费者
  pub fn finish(mut self) -> Result<()> {
    self.stop()
  }

  fn stop(&mut self) -> Result<()> {
    self.tx = None;
    match self.task.take() {
      Some(task) => task.wait(),
      None => Err(Error::PipeClosed),
    }
  }
}
